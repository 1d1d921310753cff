//! Error types for scope definitions and instantiation

/// Errors while building a [`ScopeDefinition`](crate::ScopeDefinition)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// Entry is a pass-through unit and has no identity to match on
    #[error("unit '{name}' is not overridable (it was wrapped with enabled = false)")]
    NotOverridable {
        /// Declared name
        name: String,
    },

    /// Same name declared twice
    #[error("unit name '{name}' declared twice")]
    DuplicateName {
        /// Declared name
        name: String,
    },

    /// Same unit declared under two names
    #[error("unit '{name}' is already declared as '{existing}'")]
    DuplicateUnit {
        /// Second declared name
        name: String,
        /// First declared name
        existing: String,
    },
}

/// Errors while instantiating a scope
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// Substitute signature differs from the named unit's
    #[error("substitute for '{name}' has signature {actual}, expected {expected}")]
    SignatureMismatch {
        /// Name the substitute was supplied under
        name: String,
        /// Signature of the declared unit
        expected: &'static str,
        /// Signature of the supplied substitute
        actual: &'static str,
    },
}
