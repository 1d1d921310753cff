//! OVR Unit
//!
//! Wraps a raw unit into an [`Overridable`] with a stable identity. At call
//! time the wrapper asks the nearest registry for a substitute and falls back
//! to the raw unit when none applies.
//!
//! # Example
//!
//! ```rust
//! use ovr_unit::{make_overridable, OverridableOptions};
//!
//! fn greet(name: &'static str) -> String {
//!     format!("hello {name}")
//! }
//!
//! let unit = make_overridable(greet, OverridableOptions::new());
//! assert_eq!(unit.call("world"), "hello world");
//! assert_eq!(unit.name(), Some("greet"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod unit;

pub use error::UnitError;
pub use unit::{
    display_name_of, from_arc, make_overridable, testable, Overridable, OverridableOptions,
    UnitFn, UnitHandle,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
