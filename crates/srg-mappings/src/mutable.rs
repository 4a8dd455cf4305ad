use std::fmt;

use indexmap::IndexMap;
use srg_types::{ClassName, FieldId, MethodId, TypeRef};

use crate::error::{MappingsError, Result};
use crate::immutable::ImmutableMappings;
use crate::Mappings;

/// Editable mappings with late-bound member types.
///
/// Only class renames and member *names* are stored. Member owners and
/// descriptors are resolved against the current class table on every lookup,
/// so registering a class rename after a member rename changes the member's
/// resolved owner too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutableMappings {
    classes: IndexMap<ClassName, ClassName>,
    method_names: IndexMap<MethodId, String>,
    field_names: IndexMap<FieldId, String>,
}

impl MutableMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a class's new name. Mapping a class to itself removes its entry.
    pub fn put_class(&mut self, original: ClassName, renamed: ClassName) {
        if original == renamed {
            self.classes.shift_remove(&original);
        } else {
            self.classes.insert(original, renamed);
        }
    }

    /// Like [`MutableMappings::put_class`], rejecting primitive and array types.
    pub fn put_class_type(&mut self, original: &TypeRef, renamed: &TypeRef) -> Result<()> {
        let original = original.as_class()?.clone();
        let renamed = renamed.as_class()?.clone();
        self.put_class(original, renamed);
        Ok(())
    }

    pub fn put_method_name(&mut self, original: MethodId, name: impl Into<String>) {
        self.method_names.insert(original, name.into());
    }

    /// Set a method's new name, checking that `renamed` carries the types the
    /// current class table gives `original`.
    pub fn put_method(&mut self, original: MethodId, renamed: &MethodId) -> Result<()> {
        let expected = original.map_types(|class| self.resolve_class(class));
        if !expected.has_same_types(renamed) {
            return Err(MappingsError::InconsistentMapping {
                kind: "method",
                original: original.to_string(),
                renamed: renamed.to_string(),
            });
        }
        self.put_method_name(original, renamed.name.clone());
        Ok(())
    }

    pub fn put_field_name(&mut self, original: FieldId, name: impl Into<String>) {
        self.field_names.insert(original, name.into());
    }

    /// Set a field's new name, checking that `renamed` has the owner the
    /// current class table gives `original`.
    pub fn put_field(&mut self, original: FieldId, renamed: &FieldId) -> Result<()> {
        let expected = original.map_types(|class| self.resolve_class(class));
        if !expected.has_same_types(renamed) {
            return Err(MappingsError::InconsistentMapping {
                kind: "field",
                original: original.to_string(),
                renamed: renamed.to_string(),
            });
        }
        self.put_field_name(original, renamed.name.clone());
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.method_names.is_empty() && self.field_names.is_empty()
    }

    /// Materialize the current state.
    pub fn freeze(&self) -> ImmutableMappings {
        ImmutableMappings::from_names(
            self.classes.clone(),
            self.method_names.clone(),
            self.field_names.clone(),
        )
    }
}

impl Mappings for MutableMappings {
    fn resolve_class(&self, original: &ClassName) -> ClassName {
        self.classes.get(original).unwrap_or(original).clone()
    }

    fn resolve_method(&self, original: &MethodId) -> MethodId {
        let renamed = original.map_types(|class| self.resolve_class(class));
        match self.method_names.get(original) {
            Some(name) => renamed.with_name(name.as_str()),
            None => renamed,
        }
    }

    fn resolve_field(&self, original: &FieldId) -> FieldId {
        let renamed = original.map_types(|class| self.resolve_class(class));
        match self.field_names.get(original) {
            Some(name) => renamed.with_name(name.as_str()),
            None => renamed,
        }
    }

    fn classes(&self) -> Box<dyn Iterator<Item = &ClassName> + '_> {
        Box::new(self.classes.keys())
    }

    fn methods(&self) -> Box<dyn Iterator<Item = &MethodId> + '_> {
        Box::new(self.method_names.keys())
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &FieldId> + '_> {
        Box::new(self.field_names.keys())
    }

    fn for_each_class(&self, f: &mut dyn FnMut(&ClassName, &ClassName)) {
        for (original, renamed) in &self.classes {
            f(original, renamed);
        }
    }

    fn snapshot(&self) -> Result<ImmutableMappings> {
        Ok(self.freeze())
    }

    fn inverted(&self) -> Result<ImmutableMappings> {
        Ok(self.freeze().invert())
    }
}

impl fmt::Display for MutableMappings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.freeze(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use srg_types::{Descriptor, PrimitiveType};

    fn class(name: &str) -> ClassName {
        ClassName::new(name)
    }

    fn method(owner: &str, name: &str, desc: &str) -> MethodId {
        MethodId::new(owner, name, Descriptor::parse(desc).unwrap())
    }

    #[test]
    fn class_renames_apply_retroactively_to_members() {
        let mut mappings = MutableMappings::new();
        mappings.put_field_name(FieldId::new("A", "f"), "renamed");
        mappings.put_method_name(method("A", "m", "(LA;)LA;"), "run");
        assert_eq!(
            mappings.resolve_field(&FieldId::new("A", "f")),
            FieldId::new("A", "renamed")
        );

        mappings.put_class(class("A"), class("B"));
        assert_eq!(
            mappings.resolve_field(&FieldId::new("A", "f")),
            FieldId::new("B", "renamed")
        );
        assert_eq!(
            mappings.resolve_method(&method("A", "m", "(LA;)LA;")),
            method("B", "run", "(LB;)LB;")
        );
    }

    #[test]
    fn identity_class_mapping_removes_entry() {
        let mut mappings = MutableMappings::new();
        mappings.put_class(class("A"), class("B"));
        assert_eq!(mappings.classes().count(), 1);
        mappings.put_class(class("A"), class("A"));
        assert_eq!(mappings.classes().count(), 0);
        assert!(mappings.is_empty());
    }

    #[test]
    fn put_class_type_rejects_non_reference_types() {
        let mut mappings = MutableMappings::new();
        let err = mappings
            .put_class_type(&TypeRef::Primitive(PrimitiveType::Int), &TypeRef::class("B"))
            .unwrap_err();
        assert!(matches!(err, MappingsError::Type(_)));
        assert!(mappings.is_empty());
    }

    #[test]
    fn put_member_checks_types_against_current_class_table() {
        let mut mappings = MutableMappings::new();
        mappings.put_class(class("ab"), class("Cow"));

        mappings
            .put_method(
                method("ab", "a", "(Lab;)V"),
                &method("Cow", "love", "(LCow;)V"),
            )
            .unwrap();
        let err = mappings
            .put_field(FieldId::new("ab", "b"), &FieldId::new("ab", "age"))
            .unwrap_err();
        assert!(matches!(
            err,
            MappingsError::InconsistentMapping { kind: "field", .. }
        ));
        assert_eq!(mappings.fields().count(), 0);
    }

    #[test]
    fn for_each_yields_resolved_pairs() {
        let mut mappings = MutableMappings::new();
        mappings.put_field_name(FieldId::new("A", "f"), "g");
        mappings.put_class(class("A"), class("B"));

        let mut pairs = Vec::new();
        mappings.for_each_field(&mut |original, renamed| {
            pairs.push((original.clone(), renamed.clone()));
        });
        assert_eq!(
            pairs,
            vec![(FieldId::new("A", "f"), FieldId::new("B", "g"))]
        );
    }

    #[test]
    fn snapshot_is_detached_from_later_edits() {
        let mut mappings = MutableMappings::new();
        mappings.put_class(class("A"), class("B"));
        let snapshot = mappings.snapshot().unwrap();
        mappings.put_class(class("A"), class("C"));
        assert_eq!(snapshot.resolve_class(&class("A")), class("B"));
        assert_eq!(mappings.resolve_class(&class("A")), class("C"));
    }

    #[test]
    fn inverted_materializes_first() {
        let mut mappings = MutableMappings::new();
        mappings.put_class(class("ad"), class("World"));
        mappings.put_field_name(FieldId::new("ad", "a"), "time");

        let inverse = mappings.inverted().unwrap();
        assert_eq!(
            inverse.resolve_field(&FieldId::new("World", "time")),
            FieldId::new("ad", "a")
        );
        assert_eq!(inverse.invert(), mappings.freeze());
    }
}
