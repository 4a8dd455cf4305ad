//! Renaming tables between two naming schemes of a JVM symbol table.
//!
//! Three implementations share the [`Mappings`] contract and differ in when
//! renamed owners and descriptors are computed:
//!
//! * [`ImmutableMappings`] computes them once, at construction.
//! * [`MutableMappings`] stores only name deltas and recomputes on every
//!   lookup, so later class renames are reflected in earlier member entries.
//! * [`RenamingMappings`] computes everything from rules and has nothing to
//!   enumerate, snapshot or invert.
//!
//! [`chain`] composes any sequence of them into one [`ImmutableMappings`].
#![forbid(unsafe_code)]

mod chain;
mod error;
mod immutable;
mod mutable;
mod renaming;

use srg_types::{ClassName, FieldId, MethodId, TypeRef};

pub use crate::chain::chain;
pub use crate::error::{MappingsError, Result};
pub use crate::immutable::ImmutableMappings;
pub use crate::mutable::MutableMappings;
pub use crate::renaming::RenamingMappings;

/// Read access to a renaming table.
///
/// Every lookup falls back to the identity for symbols the table doesn't
/// mention. Enumeration only ever yields explicitly registered entries.
pub trait Mappings {
    fn resolve_class(&self, original: &ClassName) -> ClassName;

    fn resolve_method(&self, original: &MethodId) -> MethodId;

    fn resolve_field(&self, original: &FieldId) -> FieldId;

    fn classes(&self) -> Box<dyn Iterator<Item = &ClassName> + '_>;

    fn methods(&self) -> Box<dyn Iterator<Item = &MethodId> + '_>;

    fn fields(&self) -> Box<dyn Iterator<Item = &FieldId> + '_>;

    /// Like [`Mappings::resolve_class`] for callers holding an arbitrary type.
    fn resolve_class_type(&self, original: &TypeRef) -> Result<ClassName> {
        Ok(self.resolve_class(original.as_class()?))
    }

    fn resolve_type(&self, original: &TypeRef) -> TypeRef {
        original.map_class(|class| self.resolve_class(class))
    }

    fn for_each_class(&self, f: &mut dyn FnMut(&ClassName, &ClassName)) {
        for original in self.classes() {
            f(original, &self.resolve_class(original));
        }
    }

    fn for_each_method(&self, f: &mut dyn FnMut(&MethodId, &MethodId)) {
        for original in self.methods() {
            f(original, &self.resolve_method(original));
        }
    }

    fn for_each_field(&self, f: &mut dyn FnMut(&FieldId, &FieldId)) {
        for original in self.fields() {
            f(original, &self.resolve_field(original));
        }
    }

    /// Freeze the current state.
    fn snapshot(&self) -> Result<ImmutableMappings> {
        let mut classes = Vec::new();
        let mut methods = Vec::new();
        let mut fields = Vec::new();
        self.for_each_class(&mut |original, renamed| {
            classes.push((original.clone(), renamed.clone()));
        });
        self.for_each_method(&mut |original, renamed| {
            methods.push((original.clone(), renamed.clone()));
        });
        self.for_each_field(&mut |original, renamed| {
            fields.push((original.clone(), renamed.clone()));
        });
        ImmutableMappings::new(classes, methods, fields)
    }

    /// Swap original and renamed names in all three tables.
    ///
    /// The result is a copy; later changes to `self` are not reflected.
    fn inverted(&self) -> Result<ImmutableMappings> {
        Ok(self.snapshot()?.invert())
    }
}

/// Verify that every explicit member entry agrees with the class table.
///
/// Mapping the original's owner (and descriptor) through the class table must
/// give exactly the renamed entry's owner (and descriptor).
pub fn check_consistency(mappings: &dyn Mappings) -> Result<()> {
    let mut result = Ok(());
    mappings.for_each_field(&mut |original, renamed| {
        if result.is_ok() {
            let expected = original.map_types(|class| mappings.resolve_class(class));
            if !expected.has_same_types(renamed) {
                result = Err(MappingsError::InconsistentMapping {
                    kind: "field",
                    original: original.to_string(),
                    renamed: renamed.to_string(),
                });
            }
        }
    });
    result?;

    let mut result = Ok(());
    mappings.for_each_method(&mut |original, renamed| {
        if result.is_ok() {
            let expected = original.map_types(|class| mappings.resolve_class(class));
            if !expected.has_same_types(renamed) {
                result = Err(MappingsError::InconsistentMapping {
                    kind: "method",
                    original: original.to_string(),
                    renamed: renamed.to_string(),
                });
            }
        }
    });
    result
}
