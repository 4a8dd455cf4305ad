use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::error::{Result, TypeError};
use crate::name::{is_well_formed_class_name, ClassName};

/// A field, identified by its declaring class and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId {
    pub owner: ClassName,
    pub name: String,
}

/// A method, identified by its declaring class, name and descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId {
    pub owner: ClassName,
    pub name: String,
    pub descriptor: Descriptor,
}

impl FieldId {
    pub fn new(owner: impl Into<ClassName>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name`, splitting at the last `/`.
    pub fn from_internal_name(internal_name: &str) -> Result<Self> {
        let (owner, name) = split_member_name(internal_name)?;
        Ok(Self::new(owner, name))
    }

    pub fn internal_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            owner: self.owner.clone(),
            name: name.into(),
        }
    }

    pub fn map_types(&self, mut f: impl FnMut(&ClassName) -> ClassName) -> Self {
        Self {
            owner: f(&self.owner),
            name: self.name.clone(),
        }
    }

    pub fn has_same_types(&self, other: &FieldId) -> bool {
        self.owner == other.owner
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassName> {
        std::iter::once(&self.owner)
    }
}

impl MethodId {
    pub fn new(
        owner: impl Into<ClassName>,
        name: impl Into<String>,
        descriptor: Descriptor,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor,
        }
    }

    /// Parse `owner/name` plus a separate descriptor string.
    pub fn from_internal_name(internal_name: &str, descriptor: &str) -> Result<Self> {
        let (owner, name) = split_member_name(internal_name)?;
        Ok(Self::new(owner, name, Descriptor::parse(descriptor)?))
    }

    pub fn internal_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            owner: self.owner.clone(),
            name: name.into(),
            descriptor: self.descriptor.clone(),
        }
    }

    /// Rename the owner and every class in the descriptor; the name is kept.
    pub fn map_types(&self, mut f: impl FnMut(&ClassName) -> ClassName) -> Self {
        Self {
            owner: f(&self.owner),
            name: self.name.clone(),
            descriptor: self.descriptor.map_classes_dyn(&mut f),
        }
    }

    pub fn has_same_types(&self, other: &MethodId) -> bool {
        self.owner == other.owner && self.descriptor == other.descriptor
    }

    /// The owner followed by every class in the descriptor.
    pub fn classes(&self) -> impl Iterator<Item = &ClassName> {
        std::iter::once(&self.owner).chain(self.descriptor.classes())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.owner, self.name, self.descriptor)
    }
}

fn split_member_name(internal_name: &str) -> Result<(&str, &str)> {
    let malformed = || TypeError::MalformedMemberName(internal_name.to_string());
    let (owner, name) = internal_name.rsplit_once('/').ok_or_else(malformed)?;
    if name.is_empty() || !is_well_formed_class_name(owner) {
        return Err(malformed());
    }
    Ok((owner, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_from_internal_name_splits_at_last_slash() {
        let field = FieldId::from_internal_name("net/minecraft/server/World/time").unwrap();
        assert_eq!(field.owner, ClassName::new("net/minecraft/server/World"));
        assert_eq!(field.name, "time");
        assert_eq!(field.internal_name(), "net/minecraft/server/World/time");
    }

    #[test]
    fn member_without_owner_is_malformed() {
        assert_eq!(
            FieldId::from_internal_name("time"),
            Err(TypeError::MalformedMemberName("time".to_string()))
        );
        assert!(FieldId::from_internal_name("World/").is_err());
        assert!(FieldId::from_internal_name("/time").is_err());
        assert!(matches!(
            MethodId::from_internal_name("World/tick", "()"),
            Err(TypeError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn with_name_keeps_types() {
        let method = MethodId::from_internal_name("Cow/a", "(LCow;)V").unwrap();
        let renamed = method.with_name("love");
        assert_eq!(renamed.name, "love");
        assert!(renamed.has_same_types(&method));
        assert_ne!(renamed, method);
    }

    #[test]
    fn map_types_rewrites_owner_and_descriptor() {
        let method = MethodId::from_internal_name("ab/a", "(Lab;[Lac;I)Lad;").unwrap();
        let mapped = method.map_types(|c| ClassName::new(format!("pkg/{c}")));
        assert_eq!(mapped.to_string(), "pkg/ab/a (Lpkg/ab;[Lpkg/ac;I)Lpkg/ad;");
        assert_eq!(mapped.name, "a");

        let field = FieldId::new("aa", "a").map_types(|_| ClassName::new("Entity"));
        assert_eq!(field, FieldId::new("Entity", "a"));
    }

    #[test]
    fn has_same_types_ignores_names_only() {
        let a = MethodId::from_internal_name("World/a", "()V").unwrap();
        let b = MethodId::from_internal_name("World/tick", "()V").unwrap();
        let c = MethodId::from_internal_name("World/a", "(I)V").unwrap();
        assert!(a.has_same_types(&b));
        assert!(!a.has_same_types(&c));
        assert!(!FieldId::new("A", "x").has_same_types(&FieldId::new("B", "x")));
    }

    #[test]
    fn classes_lists_owner_then_descriptor() {
        let method = MethodId::from_internal_name("ab/a", "(Lab;I[[Lac;)V").unwrap();
        let classes: Vec<_> = method.classes().map(ClassName::as_str).collect();
        assert_eq!(classes, vec!["ab", "ab", "ac"]);
    }
}
