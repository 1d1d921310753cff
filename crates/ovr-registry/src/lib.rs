//! OVR Registry
//!
//! The override registry primitive: an immutable snapshot of substitutes keyed
//! by unit identity, chained to the registry of the enclosing scope.
//!
//! # Core Concepts
//!
//! - [`UnitId`] / [`UnitDescriptor`]: identity issued once per wrapped unit
//! - [`Substitute`]: a replacement implementation with the unit's signature
//! - [`OverrideMap`]: the substitutes supplied at one scope
//! - [`Registry`]: local map → parent chain, with per-scope [`HelpPolicy`]
//! - [`context`]: "publish for subtree" / "read nearest" host primitives
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ovr_registry::{context, OverrideMap, Registry, Substitute, UnitDescriptor};
//!
//! let unit = UnitDescriptor::new("useAnswer");
//!
//! let mut map = OverrideMap::new();
//! map.insert_typed(&unit, Substitute::new(|(): ()| 42_u32));
//! let registry = Arc::new(Registry::new(None, map));
//!
//! let answer = context::provide(registry, || {
//!     let nearest = context::nearest().expect("registry published");
//!     let substitute = nearest.resolve::<(), u32>(&unit).unwrap().unwrap();
//!     substitute.call(())
//! });
//! assert_eq!(answer, 42);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod context;
mod error;
mod registry;
mod substitute;
mod unit;

// Re-exports
pub use error::{ParseHelpPolicyError, ResolveError};
pub use registry::{HelpPolicy, OverrideMap, Registry, ScopeInfo, Vocabulary};
pub use substitute::{signature_of, ErasedSubstitute, Substitute};
pub use unit::{UnitDescriptor, UnitId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
