//! Override scope factory
//!
//! Instantiation merges the constructor's defaults with the caller's
//! overrides (caller wins), translates names to unit identities through the
//! definition, reads the enclosing registry, and builds a new registry
//! chained to it. Nothing is mutated: every instantiation yields a fresh
//! registry.

use crate::definition::ScopeDefinition;
use crate::error::ScopeError;
use crate::overrides::{OverrideKey, Overrides};
use ovr_registry::context::{self, Provided};
use ovr_registry::{HelpPolicy, OverrideMap, Registry, ScopeInfo};
use ovr_unit::UnitHandle;
use std::future::Future;
use std::sync::Arc;

/// Options for [`make_overrides_scope`]
#[derive(Debug, Clone, Default)]
pub struct ScopeOptions {
    /// Applied to every instantiation before the caller's overrides
    pub defaults: Overrides,
}

impl ScopeOptions {
    /// No defaults
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default overrides
    #[inline]
    #[must_use]
    pub fn with_defaults(mut self, defaults: Overrides) -> Self {
        self.defaults = defaults;
        self
    }
}

/// Create a scope constructor for `definition`
#[must_use]
pub fn make_overrides_scope(definition: ScopeDefinition, options: ScopeOptions) -> ScopeConstructor {
    let names: Vec<&str> = definition.names().collect();
    let label: Arc<str> = format!("OverridesScope({})", names.join(",")).into();
    ScopeConstructor {
        definition: Arc::new(definition),
        defaults: Arc::new(options.defaults),
        label,
    }
}

/// Creates scope instances over a fixed vocabulary
#[derive(Debug, Clone)]
pub struct ScopeConstructor {
    definition: Arc<ScopeDefinition>,
    defaults: Arc<Overrides>,
    label: Arc<str>,
}

impl ScopeConstructor {
    /// Display name, e.g. `OverridesScope(useCounter,useToggle)`
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.label
    }

    /// Vocabulary of this scope type
    #[inline]
    #[must_use]
    pub fn definition(&self) -> &ScopeDefinition {
        &self.definition
    }

    /// Instantiate below the nearest published registry, help off
    ///
    /// # Errors
    /// [`ScopeError::SignatureMismatch`] if a named substitute does not fit its unit.
    pub fn instantiate(&self, overrides: Overrides) -> Result<ScopeInstance, ScopeError> {
        self.instantiate_with(HelpPolicy::Off, overrides)
    }

    /// Instantiate below the nearest published registry
    ///
    /// # Errors
    /// [`ScopeError::SignatureMismatch`] if a named substitute does not fit its unit.
    pub fn instantiate_with(
        &self,
        help: impl Into<HelpPolicy>,
        overrides: Overrides,
    ) -> Result<ScopeInstance, ScopeError> {
        self.instantiate_in(context::nearest(), help, overrides)
    }

    /// Instantiate below an explicitly threaded parent registry
    ///
    /// # Errors
    /// [`ScopeError::SignatureMismatch`] if a named substitute does not fit its unit.
    pub fn instantiate_in(
        &self,
        parent: Option<Arc<Registry>>,
        help: impl Into<HelpPolicy>,
        overrides: Overrides,
    ) -> Result<ScopeInstance, ScopeError> {
        let help = help.into();
        let map = self.build_map(&overrides)?;
        let override_count = map.len();

        let info = ScopeInfo::new(
            Arc::clone(&self.label),
            help,
            Arc::clone(self.definition.vocabulary()),
        );
        let registry = Arc::new(Registry::with_scope(parent, map, info));

        tracing::debug!(
            scope = %self.label,
            overrides = override_count,
            depth = registry.depth(),
            help = %help,
            "override scope instantiated"
        );

        Ok(ScopeInstance { registry, help })
    }

    /// Instantiate and run `f` inside the new scope
    ///
    /// # Errors
    /// Same as [`instantiate`](Self::instantiate); `f` does not run then.
    pub fn provide<T>(&self, overrides: Overrides, f: impl FnOnce() -> T) -> Result<T, ScopeError> {
        Ok(self.instantiate(overrides)?.run(f))
    }

    /// Instantiate with a help policy and run `f` inside the new scope
    ///
    /// # Errors
    /// Same as [`instantiate`](Self::instantiate); `f` does not run then.
    pub fn provide_with<T>(
        &self,
        help: impl Into<HelpPolicy>,
        overrides: Overrides,
        f: impl FnOnce() -> T,
    ) -> Result<T, ScopeError> {
        Ok(self.instantiate_with(help, overrides)?.run(f))
    }

    fn build_map(&self, overrides: &Overrides) -> Result<OverrideMap, ScopeError> {
        let mut map = OverrideMap::new();
        for (key, substitute) in self.defaults.entries().chain(overrides.entries()) {
            let Some((name, handle)) = self.target(key) else {
                continue;
            };
            if handle.signature() != substitute.signature() {
                return Err(ScopeError::SignatureMismatch {
                    name: name.to_string(),
                    expected: handle.signature_name(),
                    actual: substitute.signature_name(),
                });
            }
            map.insert(handle.descriptor().id(), substitute.clone());
        }
        Ok(map)
    }

    fn target(&self, key: &OverrideKey) -> Option<(&str, &UnitHandle)> {
        let definition = &self.definition;
        let found = match key {
            OverrideKey::Name(name) => definition.entry(name),
            OverrideKey::Unit(descriptor) => definition
                .name_of(descriptor.id())
                .and_then(|name| definition.entry(name)),
        };
        if found.is_none() {
            let key = match key {
                OverrideKey::Name(name) => name.clone(),
                OverrideKey::Unit(descriptor) => descriptor.name().to_string(),
            };
            tracing::debug!(scope = %self.label, key = %key, "ignoring override outside scope vocabulary");
        }
        found
    }
}

/// One instantiation of a scope, owning its registry
#[derive(Debug, Clone)]
pub struct ScopeInstance {
    registry: Arc<Registry>,
    help: HelpPolicy,
}

impl ScopeInstance {
    /// Registry published by this instance
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Help policy of this instance
    #[inline]
    #[must_use]
    pub fn help(&self) -> HelpPolicy {
        self.help
    }

    /// Run `f` with this instance's registry published
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        context::provide(Arc::clone(&self.registry), f)
    }

    /// Run `future` with this instance's registry published on every poll
    pub fn run_async<F: Future>(&self, future: F) -> Provided<F> {
        context::provide_future(Arc::clone(&self.registry), future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovr_registry::Substitute;
    use ovr_test_utils::{use_counter, use_toggle, Counter, Toggle};
    use ovr_unit::Overridable;
    use pretty_assertions::assert_eq;

    struct Fixture {
        scope: ScopeConstructor,
        counter: Overridable<i64, Counter>,
    }

    fn fixture() -> Fixture {
        fixture_with(ScopeOptions::new())
    }

    fn fixture_with(options: ScopeOptions) -> Fixture {
        let counter = use_counter();
        let toggle: Overridable<bool, Toggle> = use_toggle();
        let definition = ScopeDefinition::builder()
            .unit("useCounter", &counter)
            .unit("useToggle", &toggle)
            .build()
            .unwrap();
        Fixture {
            scope: make_overrides_scope(definition, options),
            counter,
        }
    }

    fn fixed(count: i64) -> Substitute<i64, Counter> {
        Substitute::new(move |_: i64| Counter::fixed(count))
    }

    #[test]
    fn display_name_lists_vocabulary() {
        let f = fixture();
        assert_eq!(f.scope.display_name(), "OverridesScope(useCounter,useToggle)");
    }

    #[test]
    fn empty_instantiation_is_transparent() {
        let f = fixture();
        let count = f.scope.provide(Overrides::new(), || f.counter.call(0).count).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn named_override_applies_inside_only() {
        let f = fixture();
        let overrides = Overrides::new().with("useCounter", fixed(55));
        let inside = f.scope.provide(overrides, || f.counter.call(0).count).unwrap();
        assert_eq!(inside, 55);
        assert_eq!(f.counter.call(0).count, 0);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let f = fixture();
        let overrides = Overrides::new().with("useNothing", fixed(1));
        let instance = f.scope.instantiate(overrides).unwrap();
        assert!(instance.registry().overrides().is_empty());
    }

    #[test]
    fn unit_keyed_override_outside_vocabulary_is_ignored() {
        let f = fixture();
        let outsider = use_counter();
        let overrides = Overrides::new().with_unit(&outsider, fixed(1));
        let instance = f.scope.instantiate(overrides).unwrap();
        assert!(instance.registry().overrides().is_empty());
    }

    #[test]
    fn signature_mismatch_is_rejected() {
        let f = fixture();
        let overrides = Overrides::new().with("useCounter", Substitute::new(|(): ()| 5_i64));
        let err = f.scope.instantiate(overrides).unwrap_err();
        assert!(matches!(err, ScopeError::SignatureMismatch { ref name, .. } if name == "useCounter"));
    }

    #[test]
    fn caller_beats_defaults() {
        let defaults = Overrides::new().with("useCounter", fixed(9999));
        let f = fixture_with(ScopeOptions::new().with_defaults(defaults));

        let from_defaults = f.scope.provide(Overrides::new(), || f.counter.call(0).count).unwrap();
        assert_eq!(from_defaults, 9999);

        let caller = Overrides::new().with_unit(&f.counter, fixed(1));
        let from_caller = f.scope.provide(caller, || f.counter.call(0).count).unwrap();
        assert_eq!(from_caller, 1);
    }

    #[test]
    fn later_entries_replace_earlier() {
        let f = fixture();
        let overrides = Overrides::new().with("useCounter", fixed(1)).with("useCounter", fixed(2));
        let count = f.scope.provide(overrides, || f.counter.call(0).count).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn instances_chain_to_enclosing_registry() {
        let f = fixture();
        let outer = f.scope.instantiate(Overrides::new()).unwrap();
        let depth = outer.run(|| {
            let inner = f.scope.instantiate(Overrides::new()).unwrap();
            assert!(Registry::same_as(inner.registry().parent().unwrap(), outer.registry()));
            inner.registry().depth()
        });
        assert_eq!(depth, 2);
    }

    #[test]
    fn explicit_parent_threading() {
        let f = fixture();
        let outer = f
            .scope
            .instantiate(Overrides::new().with("useCounter", fixed(3)))
            .unwrap();
        let inner = f
            .scope
            .instantiate_in(Some(Arc::clone(outer.registry())), HelpPolicy::Off, Overrides::new())
            .unwrap();

        let count = f.counter.call_in(Some(inner.registry()), 0).unwrap().count;
        assert_eq!(count, 3);
    }

    #[test]
    fn reinstantiation_builds_new_registry() {
        let f = fixture();
        let first = f.scope.instantiate(Overrides::new()).unwrap();
        let second = f.scope.instantiate(Overrides::new()).unwrap();
        assert!(!Registry::same_as(first.registry(), second.registry()));
    }

    #[test]
    fn help_flag_conversion() {
        let f = fixture();
        let instance = f.scope.instantiate_with(true, Overrides::new()).unwrap();
        assert_eq!(instance.help(), HelpPolicy::Warn);
        assert_eq!(
            instance.registry().scope().unwrap().label(),
            "OverridesScope(useCounter,useToggle)"
        );
    }

    #[tokio::test]
    async fn async_run_survives_await() {
        let f = fixture();
        let instance = f.scope.instantiate(Overrides::new().with("useCounter", fixed(8))).unwrap();
        let counter = f.counter.clone();

        let count = instance
            .run_async(async move {
                tokio::task::yield_now().await;
                counter.call(0).count
            })
            .await;
        assert_eq!(count, 8);
    }
}
