//! Scope definitions
//!
//! The fixed vocabulary one scope type may override: logical name → unit.
//! Names are aliases for humans; matching uses the unit's identity.

use crate::error::DefinitionError;
use indexmap::IndexMap;
use ovr_registry::{UnitId, Vocabulary};
use ovr_unit::{Overridable, UnitHandle};
use std::sync::Arc;

/// Immutable name → unit mapping, in declaration order
#[derive(Debug, Clone)]
pub struct ScopeDefinition {
    units: IndexMap<String, UnitHandle>,
    vocabulary: Arc<Vocabulary>,
}

impl ScopeDefinition {
    /// Start a definition
    #[inline]
    #[must_use]
    pub fn builder() -> DefinitionBuilder {
        DefinitionBuilder::default()
    }

    /// Unit declared under `name`
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UnitHandle> {
        self.units.get(name)
    }

    /// Declared name and unit for `name`, borrowed from the definition
    #[inline]
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<(&str, &UnitHandle)> {
        self.units
            .get_key_value(name)
            .map(|(name, handle)| (name.as_str(), handle))
    }

    /// Name `id` was declared under
    #[inline]
    #[must_use]
    pub fn name_of(&self, id: UnitId) -> Option<&str> {
        self.vocabulary.name_of(id)
    }

    /// Check if `id` belongs to this vocabulary
    #[inline]
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.vocabulary.contains(id)
    }

    /// Declared names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// Number of declared units
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if nothing is declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Identity view shared with every registry this scope type builds
    #[inline]
    #[must_use]
    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }
}

/// Builder for [`ScopeDefinition`]
///
/// The first invalid entry is remembered and reported by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct DefinitionBuilder {
    units: IndexMap<String, UnitHandle>,
    vocabulary: Vocabulary,
    error: Option<DefinitionError>,
}

impl DefinitionBuilder {
    /// Declare `unit` under `name`
    #[must_use]
    pub fn unit<A: 'static, R: 'static>(mut self, name: impl Into<String>, unit: &Overridable<A, R>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let name = name.into();
        if let Err(err) = self.declare(name, unit.handle()) {
            self.error = Some(err);
        }
        self
    }

    /// Finish the definition
    ///
    /// # Errors
    /// The first [`DefinitionError`] met while declaring units.
    pub fn build(self) -> Result<ScopeDefinition, DefinitionError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(ScopeDefinition {
            units: self.units,
            vocabulary: Arc::new(self.vocabulary),
        })
    }

    fn declare(&mut self, name: String, handle: Option<UnitHandle>) -> Result<(), DefinitionError> {
        let Some(handle) = handle else {
            return Err(DefinitionError::NotOverridable { name });
        };
        if self.units.contains_key(&name) {
            return Err(DefinitionError::DuplicateName { name });
        }
        let id = handle.descriptor().id();
        if let Some(existing) = self.vocabulary.name_of(id) {
            return Err(DefinitionError::DuplicateUnit {
                name,
                existing: existing.to_string(),
            });
        }
        self.vocabulary.insert(id, name.clone());
        self.units.insert(name, handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovr_unit::{make_overridable, OverridableOptions};
    use proptest::prelude::*;

    fn unit(name: &str) -> Overridable<(), u32> {
        make_overridable(|(): ()| 0_u32, OverridableOptions::new().with_name(name))
    }

    #[test]
    fn keeps_declaration_order() {
        let b = unit("b");
        let a = unit("a");
        let definition = ScopeDefinition::builder()
            .unit("useB", &b)
            .unit("useA", &a)
            .build()
            .unwrap();

        assert_eq!(definition.names().collect::<Vec<_>>(), vec!["useB", "useA"]);
        assert_eq!(definition.len(), 2);
        assert_eq!(definition.name_of(a.descriptor().unwrap().id()), Some("useA"));
        assert!(definition.contains(b.descriptor().unwrap().id()));
    }

    #[test]
    fn entry_borrows_declared_name() {
        let a = unit("a");
        let definition = ScopeDefinition::builder().unit("useA", &a).build().unwrap();

        let lookup = String::from("useA");
        let (name, handle) = definition.entry(&lookup).unwrap();
        drop(lookup);

        assert_eq!(name, "useA");
        assert_eq!(handle.descriptor(), a.descriptor().unwrap());
        assert!(definition.entry("useB").is_none());
    }

    #[test]
    fn rejects_pass_through_units() {
        let disabled = make_overridable(|(): ()| 0_u32, OverridableOptions::new().with_enabled(false));
        let err = ScopeDefinition::builder()
            .unit("useDisabled", &disabled)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::NotOverridable {
                name: "useDisabled".to_string()
            }
        );
    }

    #[test]
    fn rejects_duplicate_names() {
        let a = unit("a");
        let b = unit("b");
        let err = ScopeDefinition::builder()
            .unit("useX", &a)
            .unit("useX", &b)
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateName { .. }));
    }

    #[test]
    fn rejects_same_unit_twice() {
        let a = unit("a");
        let err = ScopeDefinition::builder()
            .unit("useA", &a)
            .unit("useAlias", &a.clone())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateUnit {
                name: "useAlias".to_string(),
                existing: "useA".to_string(),
            }
        );
    }

    #[test]
    fn first_error_wins() {
        let disabled = make_overridable(|(): ()| 0_u32, OverridableOptions::new().with_enabled(false));
        let a = unit("a");
        let err = ScopeDefinition::builder()
            .unit("first", &disabled)
            .unit("useA", &a)
            .unit("useA", &a)
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::NotOverridable { name } if name == "first"));
    }

    #[test]
    fn empty_definition() {
        let definition = ScopeDefinition::builder().build().unwrap();
        assert!(definition.is_empty());
        assert!(definition.vocabulary().is_empty());
    }

    proptest! {
        #[test]
        fn vocabulary_mirrors_declarations(names in prop::collection::btree_set("use[A-Z][a-z]{0,6}", 0..10)) {
            let names: Vec<String> = names.into_iter().collect();
            let units: Vec<_> = names.iter().map(|name| unit(name)).collect();

            let definition = names
                .iter()
                .zip(&units)
                .fold(ScopeDefinition::builder(), |builder, (name, unit)| builder.unit(name.as_str(), unit))
                .build()
                .unwrap();

            prop_assert_eq!(definition.names().collect::<Vec<_>>(), names.iter().map(String::as_str).collect::<Vec<_>>());
            for (name, unit) in names.iter().zip(&units) {
                prop_assert_eq!(definition.name_of(unit.descriptor().unwrap().id()), Some(name.as_str()));
            }
        }
    }
}
