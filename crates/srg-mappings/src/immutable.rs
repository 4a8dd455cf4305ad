use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use srg_types::{ClassName, FieldId, MethodId};

use crate::error::Result;
use crate::{check_consistency, Mappings};

#[derive(Debug, Default, PartialEq, Eq)]
struct Tables {
    classes: IndexMap<ClassName, ClassName>,
    methods: IndexMap<MethodId, MethodId>,
    fields: IndexMap<FieldId, FieldId>,
}

impl Tables {
    fn inverse(&self) -> Tables {
        let tables = Tables {
            classes: swap(&self.classes),
            methods: swap(&self.methods),
            fields: swap(&self.fields),
        };
        if tables.classes.len() != self.classes.len() {
            tracing::debug!(
                target: "srg.mappings",
                before = self.classes.len(),
                after = tables.classes.len(),
                "class table isn't injective; inverse keeps the last original per name"
            );
        }
        tables
    }
}

fn swap<K: Clone + Eq + std::hash::Hash>(map: &IndexMap<K, K>) -> IndexMap<K, K> {
    map.iter()
        .map(|(original, renamed)| (renamed.clone(), original.clone()))
        .collect()
}

/// Both directions of one table. The backward direction is only built when
/// something asks for it, and is then shared by every handle to the pair.
#[derive(Debug)]
struct TablePair {
    forward: Tables,
    backward: OnceLock<Tables>,
}

/// Frozen mappings with eagerly computed member targets.
///
/// Cloning is cheap. [`ImmutableMappings::invert`] returns a handle onto the
/// same storage, so inverting twice yields the original tables without
/// copying, and the inverse itself is only computed once.
#[derive(Clone)]
pub struct ImmutableMappings {
    pair: Arc<TablePair>,
    inverted: bool,
}

impl ImmutableMappings {
    pub fn empty() -> Self {
        Self::from_tables(Tables::default())
    }

    /// Build from fully specified pairs, checking that every member entry
    /// agrees with the class table. Classes mapped to themselves are dropped.
    pub fn new(
        classes: impl IntoIterator<Item = (ClassName, ClassName)>,
        methods: impl IntoIterator<Item = (MethodId, MethodId)>,
        fields: impl IntoIterator<Item = (FieldId, FieldId)>,
    ) -> Result<Self> {
        let mappings = Self::from_tables(Tables {
            classes: classes.into_iter().collect(),
            methods: methods.into_iter().collect(),
            fields: fields.into_iter().collect(),
        });
        check_consistency(&mappings)?;
        Ok(mappings)
    }

    /// Build from a class table plus new member names; the renamed owners and
    /// descriptors are derived from the class table.
    pub fn from_names(
        classes: impl IntoIterator<Item = (ClassName, ClassName)>,
        method_names: impl IntoIterator<Item = (MethodId, String)>,
        field_names: impl IntoIterator<Item = (FieldId, String)>,
    ) -> Self {
        let classes: IndexMap<ClassName, ClassName> = classes.into_iter().collect();
        let rename = |class: &ClassName| classes.get(class).unwrap_or(class).clone();
        let methods = method_names
            .into_iter()
            .map(|(original, name)| {
                let renamed = original.map_types(rename).with_name(name);
                (original, renamed)
            })
            .collect();
        let fields = field_names
            .into_iter()
            .map(|(original, name)| {
                let renamed = original.map_types(rename).with_name(name);
                (original, renamed)
            })
            .collect();
        Self::from_tables(Tables {
            classes,
            methods,
            fields,
        })
    }

    /// Freeze any mappings; shares storage when `other` is already immutable.
    pub fn copy_of(other: &dyn Mappings) -> Result<Self> {
        other.snapshot()
    }

    fn from_tables(mut tables: Tables) -> Self {
        tables.classes.retain(|original, renamed| original != renamed);
        Self {
            pair: Arc::new(TablePair {
                forward: tables,
                backward: OnceLock::new(),
            }),
            inverted: false,
        }
    }

    fn tables(&self) -> &Tables {
        if self.inverted {
            self.pair
                .backward
                .get_or_init(|| self.pair.forward.inverse())
        } else {
            &self.pair.forward
        }
    }

    pub fn invert(&self) -> ImmutableMappings {
        ImmutableMappings {
            pair: Arc::clone(&self.pair),
            inverted: !self.inverted,
        }
    }

    pub fn is_empty(&self) -> bool {
        let tables = self.tables();
        tables.classes.is_empty() && tables.methods.is_empty() && tables.fields.is_empty()
    }

    pub fn class_count(&self) -> usize {
        self.tables().classes.len()
    }

    pub fn method_count(&self) -> usize {
        self.tables().methods.len()
    }

    pub fn field_count(&self) -> usize {
        self.tables().fields.len()
    }
}

impl Mappings for ImmutableMappings {
    fn resolve_class(&self, original: &ClassName) -> ClassName {
        self.tables()
            .classes
            .get(original)
            .unwrap_or(original)
            .clone()
    }

    fn resolve_method(&self, original: &MethodId) -> MethodId {
        match self.tables().methods.get(original) {
            Some(renamed) => renamed.clone(),
            None => original.map_types(|class| self.resolve_class(class)),
        }
    }

    fn resolve_field(&self, original: &FieldId) -> FieldId {
        match self.tables().fields.get(original) {
            Some(renamed) => renamed.clone(),
            None => original.map_types(|class| self.resolve_class(class)),
        }
    }

    fn classes(&self) -> Box<dyn Iterator<Item = &ClassName> + '_> {
        Box::new(self.tables().classes.keys())
    }

    fn methods(&self) -> Box<dyn Iterator<Item = &MethodId> + '_> {
        Box::new(self.tables().methods.keys())
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &FieldId> + '_> {
        Box::new(self.tables().fields.keys())
    }

    fn for_each_class(&self, f: &mut dyn FnMut(&ClassName, &ClassName)) {
        for (original, renamed) in &self.tables().classes {
            f(original, renamed);
        }
    }

    fn for_each_method(&self, f: &mut dyn FnMut(&MethodId, &MethodId)) {
        for (original, renamed) in &self.tables().methods {
            f(original, renamed);
        }
    }

    fn for_each_field(&self, f: &mut dyn FnMut(&FieldId, &FieldId)) {
        for (original, renamed) in &self.tables().fields {
            f(original, renamed);
        }
    }

    fn snapshot(&self) -> Result<ImmutableMappings> {
        Ok(self.clone())
    }

    fn inverted(&self) -> Result<ImmutableMappings> {
        Ok(self.invert())
    }
}

impl PartialEq for ImmutableMappings {
    fn eq(&self, other: &Self) -> bool {
        self.tables() == other.tables()
    }
}

impl Eq for ImmutableMappings {}

impl Default for ImmutableMappings {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ImmutableMappings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables();
        f.debug_struct("ImmutableMappings")
            .field("classes", &tables.classes)
            .field("methods", &tables.methods)
            .field("fields", &tables.fields)
            .finish()
    }
}

impl fmt::Display for ImmutableMappings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables();
        writeln!(f, "classes:")?;
        for (original, renamed) in &tables.classes {
            writeln!(f, "  {original} = {renamed}")?;
        }
        writeln!(f, "methods:")?;
        for (original, renamed) in &tables.methods {
            writeln!(f, "  {original} = {renamed}")?;
        }
        writeln!(f, "fields:")?;
        for (original, renamed) in &tables.fields {
            writeln!(f, "  {original} = {renamed}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MappingsError;
    use pretty_assertions::assert_eq;
    use srg_types::Descriptor;

    fn class(name: &str) -> ClassName {
        ClassName::new(name)
    }

    fn method(owner: &str, name: &str, desc: &str) -> MethodId {
        MethodId::new(owner, name, Descriptor::parse(desc).unwrap())
    }

    fn sample() -> ImmutableMappings {
        ImmutableMappings::from_names(
            [(class("ab"), class("Cow")), (class("ad"), class("World"))],
            [(method("ab", "a", "(Lab;)V"), "love".to_string())],
            [(FieldId::new("ad", "a"), "time".to_string())],
        )
    }

    #[test]
    fn from_names_derives_member_types_from_class_table() {
        let mappings = sample();
        assert_eq!(
            mappings.resolve_method(&method("ab", "a", "(Lab;)V")),
            method("Cow", "love", "(LCow;)V")
        );
        assert_eq!(
            mappings.resolve_field(&FieldId::new("ad", "a")),
            FieldId::new("World", "time")
        );
    }

    #[test]
    fn unmapped_symbols_resolve_to_themselves_with_mapped_types() {
        let mappings = sample();
        assert_eq!(mappings.resolve_class(&class("zz")), class("zz"));
        assert_eq!(
            mappings.resolve_field(&FieldId::new("zz", "b")),
            FieldId::new("zz", "b")
        );
        assert_eq!(
            mappings.resolve_method(&method("zz", "b", "(Lab;)Lad;")),
            method("zz", "b", "(LCow;)LWorld;")
        );
    }

    #[test]
    fn new_rejects_members_that_disagree_with_class_table() {
        let err = ImmutableMappings::new(
            [(class("ad"), class("World"))],
            [],
            [(FieldId::new("ad", "a"), FieldId::new("ad", "time"))],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MappingsError::InconsistentMapping {
                kind: "field",
                original: "ad/a".to_string(),
                renamed: "ad/time".to_string(),
            }
        );

        let err = ImmutableMappings::new(
            [(class("ab"), class("Cow"))],
            [(method("ab", "a", "(Lab;)V"), method("Cow", "love", "(Lab;)V"))],
            [],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MappingsError::InconsistentMapping { kind: "method", .. }
        ));
    }

    #[test]
    fn new_accepts_consistent_pairs() {
        let mappings = ImmutableMappings::new(
            [(class("ab"), class("Cow"))],
            [(method("ab", "a", "(Lab;)V"), method("Cow", "love", "(LCow;)V"))],
            [],
        )
        .unwrap();
        assert_eq!(mappings.method_count(), 1);
    }

    #[test]
    fn inverse_swaps_all_tables() {
        let inverse = sample().invert();
        assert_eq!(inverse.resolve_class(&class("Cow")), class("ab"));
        assert_eq!(
            inverse.resolve_method(&method("Cow", "love", "(LCow;)V")),
            method("ab", "a", "(Lab;)V")
        );
        assert_eq!(
            inverse.resolve_field(&FieldId::new("World", "time")),
            FieldId::new("ad", "a")
        );
    }

    #[test]
    fn inverse_is_cached_and_linked() {
        let mappings = sample();
        let first = mappings.invert();
        let second = mappings.invert();
        assert!(std::ptr::eq(first.tables(), second.tables()));

        let back = first.invert();
        assert!(std::ptr::eq(back.tables(), mappings.tables()));
        assert_eq!(back, mappings);
    }

    #[test]
    fn double_inversion_is_identity() {
        let mappings = sample();
        assert_eq!(mappings.inverted().unwrap().inverted().unwrap(), mappings);
    }

    #[test]
    fn snapshot_shares_storage() {
        let mappings = sample();
        let snapshot = mappings.snapshot().unwrap();
        assert!(std::ptr::eq(snapshot.tables(), mappings.tables()));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a = ImmutableMappings::from_names(
            [(class("a"), class("A")), (class("b"), class("B"))],
            [],
            [],
        );
        let b = ImmutableMappings::from_names(
            [(class("b"), class("B")), (class("a"), class("A"))],
            [],
            [],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn display_lists_each_table() {
        let rendered = sample().to_string();
        assert!(rendered.contains("  ab = Cow"), "{rendered}");
        assert!(rendered.contains("  ad/a = World/time"), "{rendered}");
    }
}
