//! Resolution diagnostics
//!
//! Raised only by registries whose scope enabled the help policy, and only
//! when a unit is unresolved through the whole chain.

/// Help diagnostic produced while resolving a unit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Unit is outside the vocabulary of the scope that was consulted
    #[error(
        "ovr: register \"{unit}\" by adding it to make_overrides_scope({{ {} }})",
        .registered.join(", ")
    )]
    UnregisteredUnit {
        /// Display name of the unresolved unit
        unit: String,
        /// Every name in the scope's vocabulary, in declaration order
        registered: Vec<String>,
    },

    /// Unit is declared but no override was supplied at or above the scope
    #[error("ovr: no override was supplied for \"{unit}\"")]
    MissingOverride {
        /// Display name of the unresolved unit
        unit: String,
    },
}

impl ResolveError {
    /// Display name of the unit the diagnostic is about
    #[must_use]
    pub fn unit(&self) -> &str {
        match self {
            Self::UnregisteredUnit { unit, .. } | Self::MissingOverride { unit } => unit,
        }
    }

    /// Stable short name of the diagnostic, used as a log field
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnregisteredUnit { .. } => "unregistered_unit",
            Self::MissingOverride { .. } => "missing_override",
        }
    }
}

/// Invalid textual help policy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid help policy '{0}' (expected off, warn, error, true or false)")]
pub struct ParseHelpPolicyError(pub String);
