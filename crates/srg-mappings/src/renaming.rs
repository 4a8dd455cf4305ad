use std::collections::HashMap;
use std::fmt;

use srg_types::{ClassName, FieldId, MethodId};

use crate::error::{MappingsError, Result};
use crate::immutable::ImmutableMappings;
use crate::Mappings;

type ClassRule = Box<dyn Fn(&ClassName) -> Option<ClassName> + Send + Sync>;
type MethodRule = Box<dyn Fn(&MethodId) -> Option<String> + Send + Sync>;
type FieldRule = Box<dyn Fn(&FieldId) -> Option<String> + Send + Sync>;

/// Mappings computed by rules instead of tables.
///
/// Each rule returns `None` to leave a symbol alone. Member rules see the
/// original member; the owner and descriptor are renamed by the class rule
/// independently. The domain isn't enumerable, so listing yields nothing and
/// [`Mappings::snapshot`] / [`Mappings::inverted`] fail.
#[derive(Default)]
pub struct RenamingMappings {
    classes: Option<ClassRule>,
    methods: Option<MethodRule>,
    fields: Option<FieldRule>,
}

impl RenamingMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classes(
        mut self,
        rule: impl Fn(&ClassName) -> Option<ClassName> + Send + Sync + 'static,
    ) -> Self {
        self.classes = Some(Box::new(rule));
        self
    }

    pub fn with_methods(
        mut self,
        rule: impl Fn(&MethodId) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.methods = Some(Box::new(rule));
        self
    }

    pub fn with_fields(
        mut self,
        rule: impl Fn(&FieldId) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.fields = Some(Box::new(rule));
        self
    }

    /// Move every class whose package is a key of `packages` into the mapped
    /// package.
    ///
    /// Packages match exactly (subpackages are not moved). The default package
    /// is `""`. Both `net.minecraft.server` and `net/minecraft/server` are
    /// accepted.
    pub fn packages<I, K, V>(packages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let packages: HashMap<String, String> = packages
            .into_iter()
            .map(|(from, to)| (normalize_package(from.as_ref()), normalize_package(to.as_ref())))
            .collect();
        tracing::debug!(
            target: "srg.mappings",
            packages = packages.len(),
            "created package renaming rule"
        );
        Self::new().with_classes(move |class| {
            packages
                .get(class.package())
                .map(|package| class.with_package(package))
        })
    }
}

fn normalize_package(package: &str) -> String {
    package.trim().trim_matches(|c: char| c == '/' || c == '.').replace('.', "/")
}

impl Mappings for RenamingMappings {
    fn resolve_class(&self, original: &ClassName) -> ClassName {
        self.classes
            .as_ref()
            .and_then(|rule| rule(original))
            .unwrap_or_else(|| original.clone())
    }

    fn resolve_method(&self, original: &MethodId) -> MethodId {
        let renamed = original.map_types(|class| self.resolve_class(class));
        match self.methods.as_ref().and_then(|rule| rule(original)) {
            Some(name) => renamed.with_name(name),
            None => renamed,
        }
    }

    fn resolve_field(&self, original: &FieldId) -> FieldId {
        let renamed = original.map_types(|class| self.resolve_class(class));
        match self.fields.as_ref().and_then(|rule| rule(original)) {
            Some(name) => renamed.with_name(name),
            None => renamed,
        }
    }

    fn classes(&self) -> Box<dyn Iterator<Item = &ClassName> + '_> {
        Box::new(std::iter::empty())
    }

    fn methods(&self) -> Box<dyn Iterator<Item = &MethodId> + '_> {
        Box::new(std::iter::empty())
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &FieldId> + '_> {
        Box::new(std::iter::empty())
    }

    fn snapshot(&self) -> Result<ImmutableMappings> {
        Err(MappingsError::NotSnapshottable)
    }

    fn inverted(&self) -> Result<ImmutableMappings> {
        Err(MappingsError::NotInvertible)
    }
}

impl fmt::Debug for RenamingMappings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenamingMappings")
            .field("classes", &self.classes.is_some())
            .field("methods", &self.methods.is_some())
            .field("fields", &self.fields.is_some())
            .finish()
    }
}
