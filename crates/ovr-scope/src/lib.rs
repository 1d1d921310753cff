//! OVR Scope
//!
//! Scope constructors for overridable units. A [`ScopeConstructor`] is made
//! once from a named vocabulary of units; each instantiation turns a partial
//! name → substitute map into a new registry chained to the enclosing one and
//! publishes it to everything invoked inside.
//!
//! # Example
//!
//! ```rust
//! use ovr_registry::Substitute;
//! use ovr_scope::{make_overrides_scope, Overrides, ScopeDefinition, ScopeOptions};
//! use ovr_unit::{make_overridable, OverridableOptions};
//!
//! fn fetch_title(id: u32) -> String {
//!     format!("title #{id} from the network")
//! }
//!
//! let use_title = make_overridable(fetch_title, OverridableOptions::new());
//!
//! let definition = ScopeDefinition::builder()
//!     .unit("useTitle", &use_title)
//!     .build()
//!     .unwrap();
//! let scope = make_overrides_scope(definition, ScopeOptions::new());
//!
//! let overrides = Overrides::new().with("useTitle", Substitute::new(|id: u32| format!("fake #{id}")));
//! let title = scope.provide(overrides, || use_title.call(7)).unwrap();
//! assert_eq!(title, "fake #7");
//! assert_eq!(use_title.call(7), "title #7 from the network");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod definition;
mod error;
mod overrides;
mod scope;

pub use definition::{DefinitionBuilder, ScopeDefinition};
pub use error::{DefinitionError, ScopeError};
pub use overrides::Overrides;
pub use scope::{make_overrides_scope, ScopeConstructor, ScopeInstance, ScopeOptions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
