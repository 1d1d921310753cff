//! Invocation errors

use ovr_registry::ResolveError;

/// Errors raised while invoking an overridable unit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// A help-enabled scope rejected the unresolved unit
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Required unit invoked outside of any override scope
    #[error("ovr: missing override scope for \"{unit}\"")]
    MissingScope {
        /// Display name of the unit
        unit: String,
    },

    /// Required unit invoked inside scopes that do not override it
    #[error("ovr: missing override for \"{unit}\"")]
    MissingOverride {
        /// Display name of the unit
        unit: String,
    },
}

impl UnitError {
    /// Display name of the unit the error is about
    #[must_use]
    pub fn unit(&self) -> &str {
        match self {
            Self::Resolve(err) => err.unit(),
            Self::MissingScope { unit } | Self::MissingOverride { unit } => unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_errors_display_unchanged() {
        let inner = ResolveError::MissingOverride {
            unit: "useCounterRaw".to_string(),
        };
        let err: UnitError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.unit(), "useCounterRaw");
    }

    #[test]
    fn required_errors_name_the_unit() {
        let err = UnitError::MissingScope {
            unit: "useExampleData".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ovr: missing override scope for \"useExampleData\""
        );
    }
}
