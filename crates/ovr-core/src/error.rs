//! Combined error type

use ovr_config::ConfigError;
use ovr_registry::ResolveError;
use ovr_scope::{DefinitionError, ScopeError};
use ovr_unit::UnitError;

/// Any error raised by the override machinery
#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    /// Help diagnostic
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Invocation failure
    #[error(transparent)]
    Unit(#[from] UnitError),

    /// Invalid scope definition
    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Invalid instantiation
    #[error("scope error: {0}")]
    Scope(#[from] ScopeError),

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl OverrideError {
    /// Whether this is a help diagnostic, directly or through an invocation
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Resolve(_) | Self::Unit(UnitError::Resolve(_)))
    }
}

/// Result type alias for override operations
pub type OverrideResult<T> = Result<T, OverrideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_keep_their_message() {
        let err: OverrideError = ResolveError::MissingOverride {
            unit: "use_counter_raw".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "ovr: no override was supplied for \"use_counter_raw\""
        );
        assert!(err.is_diagnostic());
    }

    #[test]
    fn error_conversions() {
        let err: OverrideError = DefinitionError::DuplicateName {
            name: "useX".to_string(),
        }
        .into();
        assert!(matches!(err, OverrideError::Definition(_)));
        assert!(!err.is_diagnostic());
        assert!(err.to_string().starts_with("definition error: "));
    }
}
