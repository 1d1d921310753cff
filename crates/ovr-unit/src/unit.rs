//! Unit wrapper factory
//!
//! [`make_overridable`] turns a raw unit into an [`Overridable`]. Enabled
//! wrappers carry a [`UnitDescriptor`] and consult the nearest registry on
//! every call; disabled ones carry no descriptor and call the raw unit
//! directly, so no scope can ever reach them.

use crate::error::UnitError;
use ovr_config::OverridesConfig;
use ovr_registry::{context, signature_of, Registry, UnitDescriptor};
use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

/// Shared raw unit `Fn(A) -> R`
pub type UnitFn<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// Options for [`make_overridable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverridableOptions {
    /// Wrap at all; `false` yields a permanent pass-through
    pub enabled: bool,
    /// Fail instead of running the raw unit when nothing overrides it
    pub required: bool,
    /// Display name; derived from the raw unit when absent
    pub name: Option<String>,
}

impl OverridableOptions {
    /// Enabled, not required, derived name
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With enabled flag
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// With required flag
    #[inline]
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// With explicit display name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Default for OverridableOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            required: false,
            name: None,
        }
    }
}

impl From<&OverridesConfig> for OverridableOptions {
    fn from(config: &OverridesConfig) -> Self {
        Self {
            enabled: config.enabled,
            required: config.required,
            name: None,
        }
    }
}

/// Identity of a wrapped unit together with its signature
///
/// What a scope definition stores per declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitHandle {
    descriptor: UnitDescriptor,
    signature: TypeId,
    signature_name: &'static str,
}

impl UnitHandle {
    /// Descriptor of the wrapped unit
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &UnitDescriptor {
        &self.descriptor
    }

    /// Signature key, comparable with [`ovr_registry::signature_of`]
    #[inline]
    #[must_use]
    pub fn signature(&self) -> TypeId {
        self.signature
    }

    /// Human-readable signature
    #[inline]
    #[must_use]
    pub fn signature_name(&self) -> &'static str {
        self.signature_name
    }
}

#[derive(Debug)]
struct Wrapping {
    descriptor: UnitDescriptor,
    required: bool,
}

/// A unit whose implementation can be substituted per scope
///
/// Clones share identity: an override registered against one clone applies
/// to all of them.
pub struct Overridable<A, R> {
    raw: UnitFn<A, R>,
    wrapping: Option<Arc<Wrapping>>,
}

impl<A: 'static, R: 'static> Overridable<A, R> {
    /// Invoke the unit, resolving against the nearest registry
    ///
    /// # Panics
    /// When a help-enabled scope raises a diagnostic, or when a required unit
    /// resolves no substitute. Use [`try_call`](Self::try_call) to get the
    /// error as a value.
    #[track_caller]
    pub fn call(&self, args: A) -> R {
        match self.try_call(args) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Invoke the unit, resolving against the nearest registry
    ///
    /// # Errors
    /// [`UnitError`] when resolution raises or a required unit is unresolved;
    /// the raw unit does not run in that case.
    pub fn try_call(&self, args: A) -> Result<R, UnitError> {
        match &self.wrapping {
            None => Ok((self.raw)(args)),
            Some(wrapping) => {
                let registry = context::nearest();
                self.invoke(wrapping, registry.as_deref(), args)
            }
        }
    }

    /// Invoke the unit against an explicitly threaded registry
    ///
    /// # Errors
    /// Same as [`try_call`](Self::try_call).
    pub fn call_in(&self, registry: Option<&Registry>, args: A) -> Result<R, UnitError> {
        match &self.wrapping {
            None => Ok((self.raw)(args)),
            Some(wrapping) => self.invoke(wrapping, registry, args),
        }
    }

    /// Identity and signature, `None` for pass-through units
    #[must_use]
    pub fn handle(&self) -> Option<UnitHandle> {
        self.wrapping.as_ref().map(|wrapping| UnitHandle {
            descriptor: wrapping.descriptor.clone(),
            signature: signature_of::<A, R>(),
            signature_name: type_name::<fn(A) -> R>(),
        })
    }

    fn invoke(&self, wrapping: &Wrapping, registry: Option<&Registry>, args: A) -> Result<R, UnitError> {
        let descriptor = &wrapping.descriptor;
        let substitute = match registry {
            Some(registry) => registry.resolve::<A, R>(descriptor)?,
            None => None,
        };

        if let Some(substitute) = substitute {
            tracing::trace!(unit = %descriptor, "{}", descriptor.overridden_label());
            return Ok(substitute.call(args));
        }

        if wrapping.required {
            let unit = descriptor.name().to_string();
            return Err(match registry {
                None => UnitError::MissingScope { unit },
                Some(_) => UnitError::MissingOverride { unit },
            });
        }

        Ok((self.raw)(args))
    }
}

impl<A, R> Overridable<A, R> {
    /// The raw unit this wrapper falls back to
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &UnitFn<A, R> {
        &self.raw
    }

    /// Descriptor marker, `None` for pass-through units
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> Option<&UnitDescriptor> {
        self.wrapping.as_ref().map(|wrapping| &wrapping.descriptor)
    }

    /// Whether scopes can override this unit
    #[inline]
    #[must_use]
    pub fn is_overridable(&self) -> bool {
        self.wrapping.is_some()
    }

    /// Whether invocations fail without a substitute
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.wrapping.as_ref().is_some_and(|wrapping| wrapping.required)
    }

    /// Display name, `None` for pass-through units
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.descriptor().map(UnitDescriptor::name)
    }
}

impl<A, R> Clone for Overridable<A, R> {
    fn clone(&self) -> Self {
        Self {
            raw: Arc::clone(&self.raw),
            wrapping: self.wrapping.clone(),
        }
    }
}

impl<A, R> fmt::Debug for Overridable<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overridable")
            .field("descriptor", &self.descriptor())
            .field("required", &self.is_required())
            .finish_non_exhaustive()
    }
}

/// Wrap a raw unit
///
/// The display name defaults to the function item's name (closures fall back
/// to `"unit"`).
pub fn make_overridable<F, A, R>(raw: F, options: OverridableOptions) -> Overridable<A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
{
    let name = options
        .name
        .clone()
        .unwrap_or_else(|| display_name_of::<F>().to_string());
    wrap(Arc::new(raw), options.enabled, options.required, name)
}

/// Wrap an already shared raw unit
///
/// With `enabled = false` the returned wrapper holds the same `Arc`.
pub fn from_arc<A, R>(raw: UnitFn<A, R>, options: OverridableOptions) -> Overridable<A, R> {
    let name = options.name.unwrap_or_else(|| "unit".to_string());
    wrap(raw, options.enabled, options.required, name)
}

/// Wrap a unit meant to be overridden in tests and stories
///
/// `enabled` and `required` come from `config`.
pub fn testable<F, A, R>(raw: F, config: &OverridesConfig) -> Overridable<A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
{
    make_overridable(raw, OverridableOptions::from(config))
}

fn wrap<A, R>(raw: UnitFn<A, R>, enabled: bool, required: bool, name: String) -> Overridable<A, R> {
    let wrapping = enabled.then(|| {
        Arc::new(Wrapping {
            descriptor: UnitDescriptor::new(name),
            required,
        })
    });
    Overridable { raw, wrapping }
}

/// Short display name for a callable type
///
/// `my_crate::hooks::use_counter` becomes `use_counter`; closures yield `"unit"`.
#[must_use]
pub fn display_name_of<F: ?Sized>() -> &'static str {
    let full = type_name::<F>();
    if full.contains("{{closure}}") {
        return "unit";
    }
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovr_registry::{HelpPolicy, OverrideMap, ScopeInfo, Substitute, Vocabulary};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn answer(_: ()) -> u32 {
        42
    }

    fn overriding<A: 'static, R: 'static>(unit: &Overridable<A, R>, substitute: Substitute<A, R>) -> Arc<Registry> {
        let mut map = OverrideMap::new();
        map.insert_typed(unit.descriptor().unwrap(), substitute);
        Arc::new(Registry::new(None, map))
    }

    #[test]
    fn name_from_function_item() {
        let unit = make_overridable(answer, OverridableOptions::new());
        assert_eq!(unit.name(), Some("answer"));
        assert!(unit.is_overridable());
    }

    #[test]
    fn closures_get_generic_name_unless_named() {
        let anonymous = make_overridable(|x: u8| x, OverridableOptions::new());
        assert_eq!(anonymous.name(), Some("unit"));

        let named = make_overridable(|x: u8| x, OverridableOptions::new().with_name("useByte"));
        assert_eq!(named.name(), Some("useByte"));
    }

    #[test]
    fn no_scope_runs_raw() {
        let unit = make_overridable(answer, OverridableOptions::new());
        assert_eq!(unit.call(()), 42);
    }

    #[test]
    fn substitute_replaces_raw() {
        let raw_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&raw_calls);
        let unit = make_overridable(
            move |x: u32| {
                counter.fetch_add(1, Ordering::SeqCst);
                x
            },
            OverridableOptions::new(),
        );
        let registry = overriding(&unit, Substitute::new(|x: u32| x * 100));

        let value = context::provide(registry, || unit.call(3));
        assert_eq!(value, 300);
        assert_eq!(raw_calls.load(Ordering::SeqCst), 0);

        assert_eq!(unit.call(3), 3);
        assert_eq!(raw_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_is_pass_through() {
        let raw: UnitFn<(), u32> = Arc::new(answer);
        let unit = from_arc(Arc::clone(&raw), OverridableOptions::new().with_enabled(false));

        assert!(Arc::ptr_eq(unit.raw(), &raw));
        assert!(!unit.is_overridable());
        assert!(unit.descriptor().is_none());
        assert!(unit.handle().is_none());
        assert_eq!(unit.name(), None);
    }

    #[test]
    fn disabled_ignores_every_registry() {
        let enabled = make_overridable(answer, OverridableOptions::new());
        let disabled = from_arc(
            Arc::clone(enabled.raw()),
            OverridableOptions::new().with_enabled(false),
        );
        let registry = overriding(&enabled, Substitute::value(7));

        context::provide(Arc::clone(&registry), || {
            assert_eq!(enabled.call(()), 7);
            assert_eq!(disabled.call(()), 42);
        });
        assert_eq!(disabled.call_in(Some(&registry), ()).unwrap(), 42);
    }

    #[test]
    fn clones_share_identity() {
        let unit = make_overridable(answer, OverridableOptions::new());
        let twin = unit.clone();
        let registry = overriding(&unit, Substitute::value(1));
        assert_eq!(twin.call_in(Some(&registry), ()).unwrap(), 1);
    }

    #[test]
    fn separate_wraps_are_separate_units() {
        let a = make_overridable(answer, OverridableOptions::new());
        let b = make_overridable(answer, OverridableOptions::new());
        let registry = overriding(&a, Substitute::value(1));

        assert_eq!(a.call_in(Some(&registry), ()).unwrap(), 1);
        assert_eq!(b.call_in(Some(&registry), ()).unwrap(), 42);
    }

    #[test]
    fn required_without_scope() {
        let unit = make_overridable(answer, OverridableOptions::new().with_required(true));
        let err = unit.try_call(()).unwrap_err();
        assert_eq!(
            err,
            UnitError::MissingScope {
                unit: "answer".to_string()
            }
        );
    }

    #[test]
    fn required_without_override() {
        let unit = make_overridable(answer, OverridableOptions::new().with_required(true));
        let empty = Registry::new(None, OverrideMap::new());
        let err = unit.call_in(Some(&empty), ()).unwrap_err();
        assert!(matches!(err, UnitError::MissingOverride { .. }));
    }

    #[test]
    fn required_with_override() {
        let unit = make_overridable(answer, OverridableOptions::new().with_required(true));
        let registry = overriding(&unit, Substitute::value(9));
        assert_eq!(unit.call_in(Some(&registry), ()).unwrap(), 9);
    }

    #[test]
    fn help_error_surfaces_through_try_call() {
        let unit = make_overridable(answer, OverridableOptions::new());
        let mut vocabulary = Vocabulary::new();
        vocabulary.insert(unit.descriptor().unwrap().id(), "useAnswer");
        let registry = Arc::new(Registry::with_scope(
            None,
            OverrideMap::new(),
            ScopeInfo::new("test", HelpPolicy::Error, Arc::new(vocabulary)),
        ));

        let err = context::provide(registry, || unit.try_call(())).unwrap_err();
        assert_eq!(err.to_string(), "ovr: no override was supplied for \"answer\"");
    }

    #[test]
    #[should_panic(expected = "ovr: missing override scope for \"answer\"")]
    fn call_panics_on_error() {
        let unit = make_overridable(answer, OverridableOptions::new().with_required(true));
        unit.call(());
    }

    #[test]
    fn testable_follows_config() {
        let off = testable(answer, &OverridesConfig::new());
        assert!(!off.is_overridable());

        let on = testable(answer, &OverridesConfig::new().with_enabled(true));
        assert!(on.is_overridable());
        assert!(on.is_required());
    }

    #[test]
    fn handle_carries_signature() {
        let unit = make_overridable(answer, OverridableOptions::new());
        let handle = unit.handle().unwrap();
        assert_eq!(handle.signature(), signature_of::<(), u32>());
        assert_eq!(handle.signature_name(), "fn(()) -> u32");
        assert_eq!(handle.descriptor(), unit.descriptor().unwrap());
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name_of::<fn(u8) -> u8>(), "fn(u8) -> u8");
        assert_eq!(display_name_of::<String>(), "String");
        assert_eq!(display_name_of::<Vec<u8>>(), "Vec");
    }

    proptest::proptest! {
        #[test]
        fn every_wrap_gets_a_fresh_identity(count in 1usize..40) {
            let units: Vec<_> = (0..count)
                .map(|_| make_overridable(answer, OverridableOptions::new()))
                .collect();
            let mut ids: Vec<_> = units.iter().map(|unit| unit.descriptor().unwrap().id()).collect();
            ids.sort();
            ids.dedup();
            proptest::prop_assert_eq!(ids.len(), count);
        }
    }
}
