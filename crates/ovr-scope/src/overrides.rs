//! Supplied overrides
//!
//! A partial map of substitutes handed to one scope instantiation. Entries
//! are keyed by vocabulary name, or directly by unit; later entries for the
//! same unit replace earlier ones.

use ovr_registry::{ErasedSubstitute, Substitute, UnitDescriptor};
use ovr_unit::Overridable;

#[derive(Debug, Clone)]
pub(crate) enum OverrideKey {
    Name(String),
    Unit(UnitDescriptor),
}

/// Substitutes supplied to a scope
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    entries: Vec<(OverrideKey, ErasedSubstitute)>,
}

impl Overrides {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the unit declared as `name`
    #[must_use]
    pub fn with<A: 'static, R: 'static>(mut self, name: impl Into<String>, substitute: Substitute<A, R>) -> Self {
        self.entries
            .push((OverrideKey::Name(name.into()), ErasedSubstitute::new(substitute)));
        self
    }

    /// Override `unit` directly; the signature is checked at compile time
    ///
    /// Pass-through units cannot be overridden and are skipped.
    #[must_use]
    pub fn with_unit<A: 'static, R: 'static>(mut self, unit: &Overridable<A, R>, substitute: Substitute<A, R>) -> Self {
        match unit.descriptor() {
            Some(descriptor) => self.entries.push((
                OverrideKey::Unit(descriptor.clone()),
                ErasedSubstitute::new(substitute),
            )),
            None => tracing::debug!("skipping override for pass-through unit"),
        }
        self
    }

    /// Number of supplied entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was supplied
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &(OverrideKey, ErasedSubstitute)> {
        self.entries.iter()
    }
}
