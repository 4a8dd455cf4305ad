use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use srg_types::{ClassName, FieldId, MethodId};

use crate::error::Result;
use crate::immutable::ImmutableMappings;
use crate::Mappings;

/// Compose `layers` into one mapping equivalent to applying each in order.
///
/// Every layer is keyed by the names the previous layer produces. The result
/// is keyed by the names the *first* layer consumes: a member that a later
/// layer introduces is translated back through the classes composed so far,
/// and the first layer to mention a symbol fixes its original identity.
/// Symbols a layer doesn't know pass through it unchanged.
///
/// Rule-based layers contribute renames but no entries of their own, so the
/// classes they rename show up only when some other layer mentions them.
pub fn chain<'a, I>(layers: I) -> Result<ImmutableMappings>
where
    I: IntoIterator<Item = &'a dyn Mappings>,
{
    let layers: Vec<&dyn Mappings> = layers.into_iter().collect();
    let mut state = ChainState::default();
    for (index, layer) in layers.iter().enumerate() {
        state.apply(index, *layer);
    }
    state.finish(&layers)
}

/// Original identity (first layer's names) mapped to the name as it stands
/// after the layers applied so far.
#[derive(Default)]
struct ChainState {
    classes: IndexMap<ClassName, ClassName>,
    methods: IndexMap<MethodId, MethodId>,
    fields: IndexMap<FieldId, FieldId>,
}

/// Keys a layer mentions that no tracked symbol currently maps to, paired
/// with their original identity.
struct Introduced {
    classes: Vec<ClassName>,
    methods: Vec<(MethodId, MethodId)>,
    fields: Vec<(FieldId, FieldId)>,
}

impl ChainState {
    fn apply(&mut self, index: usize, layer: &dyn Mappings) {
        let introduced = self.introduced_by(index, layer);

        for current in self.classes.values_mut() {
            *current = layer.resolve_class(current);
        }
        for current in self.methods.values_mut() {
            *current = layer.resolve_method(current);
        }
        for current in self.fields.values_mut() {
            *current = layer.resolve_field(current);
        }

        tracing::debug!(
            target: "srg.mappings",
            layer = index,
            classes = introduced.classes.len(),
            methods = introduced.methods.len(),
            fields = introduced.fields.len(),
            "applying mapping layer"
        );

        for class in introduced.classes {
            let renamed = layer.resolve_class(&class);
            self.classes.entry(class).or_insert(renamed);
        }
        for (original, key) in introduced.methods {
            let renamed = layer.resolve_method(&key);
            self.methods.entry(original).or_insert(renamed);
        }
        for (original, key) in introduced.fields {
            let renamed = layer.resolve_field(&key);
            self.fields.entry(original).or_insert(renamed);
        }
    }

    fn introduced_by(&self, index: usize, layer: &dyn Mappings) -> Introduced {
        let mut originals: HashMap<&ClassName, &ClassName> = HashMap::new();
        for (original, current) in &self.classes {
            originals.entry(current).or_insert(original);
        }
        let unresolve = |class: &ClassName| -> ClassName {
            originals.get(class).map_or_else(|| class.clone(), |o| (*o).clone())
        };

        // A name no tracked class currently has, but that some tracked class
        // started out with, no longer exists in this layer's namespace.
        let renamed_away = |class: &ClassName| -> bool {
            !originals.contains_key(class)
                && self.classes.get(class).is_some_and(|current| current != class)
        };

        let current_classes: HashSet<&ClassName> = self.classes.values().collect();
        let classes = layer
            .classes()
            .filter(|key| !current_classes.contains(key))
            .filter(|key| {
                let shadowed = self.classes.contains_key(*key);
                if shadowed {
                    skipped(index, key);
                }
                !shadowed
            })
            .cloned()
            .collect();

        let current_methods: HashSet<&MethodId> = self.methods.values().collect();
        let methods = layer
            .methods()
            .filter(|key| !current_methods.contains(key))
            .filter_map(|key| {
                let original = key.map_types(unresolve);
                if key.classes().any(renamed_away) || self.methods.contains_key(&original) {
                    skipped(index, key);
                    return None;
                }
                Some((original, key.clone()))
            })
            .collect();

        let current_fields: HashSet<&FieldId> = self.fields.values().collect();
        let fields = layer
            .fields()
            .filter(|key| !current_fields.contains(key))
            .filter_map(|key| {
                let original = key.map_types(unresolve);
                if key.classes().any(renamed_away) || self.fields.contains_key(&original) {
                    skipped(index, key);
                    return None;
                }
                Some((original, key.clone()))
            })
            .collect();

        Introduced {
            classes,
            methods,
            fields,
        }
    }

    fn finish(mut self, layers: &[&dyn Mappings]) -> Result<ImmutableMappings> {
        // Classes that only appear inside member owners or descriptors still
        // need an entry when some layer renames them.
        let referenced: IndexSet<ClassName> = self
            .methods
            .keys()
            .flat_map(MethodId::classes)
            .chain(self.fields.keys().flat_map(FieldId::classes))
            .filter(|class| !self.classes.contains_key(*class))
            .cloned()
            .collect();
        for class in referenced {
            let renamed = layers
                .iter()
                .fold(class.clone(), |current, layer| layer.resolve_class(&current));
            self.classes.insert(class, renamed);
        }

        self.classes.retain(|original, renamed| original != renamed);
        self.methods.retain(|original, renamed| original != renamed);
        self.fields.retain(|original, renamed| original != renamed);

        tracing::debug!(
            target: "srg.mappings",
            layers = layers.len(),
            classes = self.classes.len(),
            methods = self.methods.len(),
            fields = self.fields.len(),
            "composed mapping layers"
        );
        ImmutableMappings::new(self.classes, self.methods, self.fields)
    }
}

fn skipped(index: usize, key: &dyn std::fmt::Display) {
    tracing::debug!(
        target: "srg.mappings",
        layer = index,
        key = %key,
        "skipping layer entry; its name was already renamed away by an earlier layer"
    );
}
