//! Override registry
//!
//! A [`Registry`] is built once per scope instantiation and never mutated.
//! Lookup consults the local [`OverrideMap`] first, then the parent chain, so
//! the nearest scope wins and scopes that do not mention a unit are
//! transparent for it.

use crate::error::{ParseHelpPolicyError, ResolveError};
use crate::substitute::{ErasedSubstitute, Substitute};
use crate::unit::{UnitDescriptor, UnitId};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Diagnostic mode of one scope instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HelpPolicy {
    /// Misses fall back to the raw unit silently
    #[default]
    Off,

    /// Misses are logged, the raw unit still runs
    Warn,

    /// Misses abort the invocation
    Error,
}

impl HelpPolicy {
    /// Whether diagnostics are produced at all
    #[inline]
    #[must_use]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl From<bool> for HelpPolicy {
    fn from(help: bool) -> Self {
        if help {
            Self::Warn
        } else {
            Self::Off
        }
    }
}

impl FromStr for HelpPolicy {
    type Err = ParseHelpPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "false" | "" => Ok(Self::Off),
            "warn" | "true" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ParseHelpPolicyError(s.to_string())),
        }
    }
}

impl fmt::Display for HelpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// Substitutes supplied at one scope, keyed by unit identity
#[derive(Debug, Default, Clone)]
pub struct OverrideMap {
    entries: HashMap<UnitId, ErasedSubstitute>,
}

impl OverrideMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an erased substitute, replacing any previous entry for `id`
    pub fn insert(&mut self, id: UnitId, substitute: ErasedSubstitute) -> Option<ErasedSubstitute> {
        self.entries.insert(id, substitute)
    }

    /// Insert a typed substitute for `unit`
    pub fn insert_typed<A: 'static, R: 'static>(
        &mut self,
        unit: &UnitDescriptor,
        substitute: Substitute<A, R>,
    ) -> Option<ErasedSubstitute> {
        self.insert(unit.id(), ErasedSubstitute::new(substitute))
    }

    /// Get substitute registered for `id`
    #[inline]
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&ErasedSubstitute> {
        self.entries.get(&id)
    }

    /// Check if `id` has a substitute
    #[inline]
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of substitutes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if map is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over overridden ids
    pub fn ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.entries.keys().copied()
    }
}

/// Units a scope type is allowed to override, in declaration order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    entries: IndexMap<UnitId, String>,
}

impl Vocabulary {
    /// Create empty vocabulary
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `id` under `name`; returns false if `id` was already declared
    pub fn insert(&mut self, id: UnitId, name: impl Into<String>) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, name.into());
        true
    }

    /// Check if `id` is declared
    #[inline]
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Logical name `id` was declared under
    #[inline]
    #[must_use]
    pub fn name_of(&self, id: UnitId) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Declared names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// Number of declared units
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if vocabulary is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scope-level data a registry needs for diagnostics
#[derive(Debug, Clone)]
pub struct ScopeInfo {
    label: Arc<str>,
    help: HelpPolicy,
    vocabulary: Arc<Vocabulary>,
}

impl ScopeInfo {
    /// Create scope info
    #[must_use]
    pub fn new(label: impl Into<Arc<str>>, help: HelpPolicy, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            label: label.into(),
            help,
            vocabulary,
        }
    }

    /// Scope label used in log fields
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Help policy of the owning instance
    #[inline]
    #[must_use]
    pub fn help(&self) -> HelpPolicy {
        self.help
    }

    /// Vocabulary of the owning scope type
    #[inline]
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

/// Immutable, parent-chained view of every substitute visible at one point
#[derive(Debug)]
pub struct Registry {
    parent: Option<Arc<Registry>>,
    overrides: OverrideMap,
    scope: Option<ScopeInfo>,
}

impl Registry {
    /// Create registry without scope diagnostics
    #[inline]
    #[must_use]
    pub fn new(parent: Option<Arc<Registry>>, overrides: OverrideMap) -> Self {
        Self {
            parent,
            overrides,
            scope: None,
        }
    }

    /// Create registry owned by a scope instance
    #[inline]
    #[must_use]
    pub fn with_scope(parent: Option<Arc<Registry>>, overrides: OverrideMap, scope: ScopeInfo) -> Self {
        Self {
            parent,
            overrides,
            scope: Some(scope),
        }
    }

    /// Resolve the substitute for `unit`
    ///
    /// Returns `Ok(None)` when nothing in the chain overrides `unit` with a
    /// matching signature. In that case every help-enabled scope in the chain
    /// is evaluated, innermost first: `Warn` logs and continues, `Error`
    /// returns the diagnostic.
    ///
    /// # Errors
    /// [`ResolveError`] when a consulted scope has [`HelpPolicy::Error`].
    pub fn resolve<A: 'static, R: 'static>(
        &self,
        unit: &UnitDescriptor,
    ) -> Result<Option<Substitute<A, R>>, ResolveError> {
        for found in self.chain().filter_map(|registry| registry.overrides.get(unit.id())) {
            if let Some(typed) = found.downcast::<A, R>() {
                return Ok(Some(typed));
            }
            tracing::debug!(
                unit = %unit,
                expected = std::any::type_name::<fn(A) -> R>(),
                actual = found.signature_name(),
                "substitute signature mismatch, ignoring"
            );
        }

        for registry in self.chain() {
            registry.diagnose(unit)?;
        }
        Ok(None)
    }

    /// Nearest erased substitute for `id`, without diagnostics
    #[must_use]
    pub fn lookup(&self, id: UnitId) -> Option<&ErasedSubstitute> {
        self.chain().find_map(|registry| registry.overrides.get(id))
    }

    /// Check if `id` resolves anywhere in the chain
    #[inline]
    #[must_use]
    pub fn is_overridden(&self, id: UnitId) -> bool {
        self.lookup(id).is_some()
    }

    /// This registry followed by its ancestors
    pub fn chain(&self) -> impl Iterator<Item = &Registry> {
        std::iter::successors(Some(self), |registry| registry.parent.as_deref())
    }

    /// Chain length, 1 for a root registry
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Parent registry, if any
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Registry>> {
        self.parent.as_ref()
    }

    /// Substitutes supplied at this level only
    #[inline]
    #[must_use]
    pub fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    /// Scope info, if built by a scope instance
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Option<&ScopeInfo> {
        self.scope.as_ref()
    }

    /// Whether two handles point at the same registry instance
    #[inline]
    #[must_use]
    pub fn same_as(a: &Arc<Registry>, b: &Arc<Registry>) -> bool {
        Arc::ptr_eq(a, b)
    }

    fn diagnose(&self, unit: &UnitDescriptor) -> Result<(), ResolveError> {
        let Some(scope) = &self.scope else {
            return Ok(());
        };
        if !scope.help.is_enabled() {
            return Ok(());
        }

        let err = if scope.vocabulary.contains(unit.id()) {
            ResolveError::MissingOverride {
                unit: unit.name().to_string(),
            }
        } else {
            ResolveError::UnregisteredUnit {
                unit: unit.name().to_string(),
                registered: scope.vocabulary.names().map(str::to_string).collect(),
            }
        };

        match scope.help {
            HelpPolicy::Error => Err(err),
            HelpPolicy::Warn | HelpPolicy::Off => {
                tracing::warn!(unit = %unit, kind = err.kind(), scope = %scope.label, "{err}");
                Ok(())
            }
        }
    }
}
