//! OVR Core
//!
//! Transparent, scope-local substitution of stateful units. Units are wrapped
//! once with [`make_overridable`]; scope types are declared once with
//! [`make_overrides_scope`]; tests and stories then nest scope instances to
//! swap implementations without touching any call site.
//!
//! # Example
//!
//! ```rust
//! use ovr_core::prelude::*;
//!
//! fn load_user(id: u32) -> String {
//!     format!("user {id} from the database")
//! }
//!
//! let use_user = make_overridable(load_user, OverridableOptions::new());
//! let scope = make_overrides_scope(
//!     ovr_core::scope_definition![use_user].unwrap(),
//!     ScopeOptions::new(),
//! );
//!
//! let shown = scope
//!     .provide(
//!         Overrides::new().with("use_user", Substitute::new(|id: u32| format!("fake {id}"))),
//!         || use_user.call(1),
//!     )
//!     .unwrap();
//! assert_eq!(shown, "fake 1");
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod error;

use once_cell::sync::Lazy;

// Re-exports for convenience
pub use error::{OverrideError, OverrideResult};
pub use ovr_config::{ConfigError, OverridesConfig};
pub use ovr_registry::{
    context, ErasedSubstitute, HelpPolicy, OverrideMap, ParseHelpPolicyError, Registry,
    ResolveError, ScopeInfo, Substitute, UnitDescriptor, UnitId, Vocabulary,
};
pub use ovr_scope::{
    make_overrides_scope, DefinitionBuilder, DefinitionError, Overrides, ScopeConstructor,
    ScopeDefinition, ScopeError, ScopeInstance, ScopeOptions,
};
pub use ovr_unit::{
    display_name_of, from_arc, make_overridable, Overridable, OverridableOptions, UnitError,
    UnitFn, UnitHandle,
};

static CONFIG: Lazy<OverridesConfig> = Lazy::new(OverridesConfig::from_env_or_default);

/// Process configuration, read from the environment on first use
#[must_use]
pub fn config() -> &'static OverridesConfig {
    &CONFIG
}

/// Wrap a unit meant to be overridden in tests and stories
///
/// Enabled only when the environment says so (see [`ovr_config`]) and
/// required by default, so a forgotten override fails loudly.
pub fn testable<F, A, R>(raw: F) -> Overridable<A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
{
    ovr_unit::testable(raw, config())
}

/// Build a [`ScopeDefinition`] whose names are the unit variables' names
///
/// `scope_definition![use_counter, use_toggle]` declares `"use_counter"` and
/// `"use_toggle"`; `name => unit` pairs declare explicit names.
#[macro_export]
macro_rules! scope_definition {
    ($($name:literal => $unit:expr),+ $(,)?) => {
        $crate::ScopeDefinition::builder()
            $(.unit($name, &$unit))+
            .build()
    };
    ($($unit:ident),* $(,)?) => {
        $crate::ScopeDefinition::builder()
            $(.unit(stringify!($unit), &$unit))*
            .build()
    };
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for overriding units
    pub use crate::{
        make_overridable, make_overrides_scope, HelpPolicy, Overridable, OverridableOptions,
        Overrides, ScopeConstructor, ScopeDefinition, ScopeOptions, Substitute,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
