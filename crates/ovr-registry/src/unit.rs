//! Unit identity
//!
//! Units are matched by an identity token issued when they are wrapped, never
//! by name or by the shape of the callable.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of an overridable unit
///
/// Issued from a process-wide counter; two wraps of the same callable receive
/// two different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    /// Issue a fresh id
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    #[inline]
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Immutable descriptor attached alongside a wrapped unit
///
/// Carries the identity used as the registry key and the display name used
/// in diagnostics. Cloning is cheap and preserves identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitDescriptor {
    id: UnitId,
    name: Arc<str>,
}

impl UnitDescriptor {
    /// Create a descriptor with a freshly issued id
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            id: UnitId::next(),
            name: name.into(),
        }
    }

    /// Identity key
    #[inline]
    #[must_use]
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Display name of the raw unit
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Debug label shown while the unit is served by a substitute
    #[must_use]
    pub fn overridden_label(&self) -> String {
        format!("Overridden({})", self.name)
    }
}

impl fmt::Display for UnitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = UnitId::next();
        let b = UnitId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn same_name_distinct_identity() {
        let a = UnitDescriptor::new("useCounter");
        let b = UnitDescriptor::new("useCounter");
        assert_eq!(a.name(), b.name());
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn clone_keeps_identity() {
        let a = UnitDescriptor::new("useToggle");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn labels() {
        let unit = UnitDescriptor::new("useCounterRaw");
        assert_eq!(unit.to_string(), "useCounterRaw");
        assert_eq!(unit.overridden_label(), "Overridden(useCounterRaw)");
        assert!(unit.id().to_string().starts_with("unit#"));
    }
}
