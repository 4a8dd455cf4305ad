use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TypeError};
use crate::name::{is_well_formed_class_name, ClassName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Void,
}

impl PrimitiveType {
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'B' => PrimitiveType::Byte,
            'C' => PrimitiveType::Char,
            'D' => PrimitiveType::Double,
            'F' => PrimitiveType::Float,
            'I' => PrimitiveType::Int,
            'J' => PrimitiveType::Long,
            'S' => PrimitiveType::Short,
            'Z' => PrimitiveType::Boolean,
            'V' => PrimitiveType::Void,
            _ => return None,
        })
    }

    pub fn code(self) -> char {
        match self {
            PrimitiveType::Byte => 'B',
            PrimitiveType::Char => 'C',
            PrimitiveType::Double => 'D',
            PrimitiveType::Float => 'F',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Short => 'S',
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Void => 'V',
        }
    }
}

/// A JVM type: primitive, array, or reference to a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    Array(Box<TypeRef>),
    Reference(ClassName),
}

impl TypeRef {
    pub fn class(name: impl Into<ClassName>) -> Self {
        TypeRef::Reference(name.into())
    }

    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    /// Parse a field descriptor (`I`, `[J`, `Ljava/lang/String;`).
    ///
    /// `V` is accepted on its own since method return types share this form.
    pub fn from_descriptor(desc: &str) -> Result<Self> {
        match parse_type(desc, true) {
            Some((ty, "")) => Ok(ty),
            _ => Err(TypeError::MalformedType(desc.to_string())),
        }
    }

    /// Parse an internal name as found in class records.
    ///
    /// Bare names are classes; `[`-prefixed names are array descriptors.
    pub fn from_internal_name(name: &str) -> Result<Self> {
        if name.starts_with('[') {
            return match parse_type(name, false) {
                Some((ty, "")) => Ok(ty),
                _ => Err(TypeError::MalformedType(name.to_string())),
            };
        }
        if !is_well_formed_class_name(name) {
            return Err(TypeError::MalformedType(name.to_string()));
        }
        Ok(TypeRef::Reference(ClassName::new(name)))
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    pub fn internal_name(&self) -> String {
        match self {
            TypeRef::Reference(name) => name.as_str().to_string(),
            _ => self.descriptor(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, TypeRef::Reference(_))
    }

    pub fn as_class(&self) -> Result<&ClassName> {
        match self {
            TypeRef::Reference(name) => Ok(name),
            _ => Err(TypeError::NotAReferenceType(self.internal_name())),
        }
    }

    pub fn into_class(self) -> Result<ClassName> {
        match self {
            TypeRef::Reference(name) => Ok(name),
            other => Err(TypeError::NotAReferenceType(other.internal_name())),
        }
    }

    /// The class at the bottom of any array nesting, if there is one.
    pub fn element_class(&self) -> Option<&ClassName> {
        match self {
            TypeRef::Primitive(_) => None,
            TypeRef::Array(element) => element.element_class(),
            TypeRef::Reference(name) => Some(name),
        }
    }

    /// Rewrite the terminal class reference with `f`, looking through arrays.
    pub fn map_class(&self, mut f: impl FnMut(&ClassName) -> ClassName) -> TypeRef {
        self.map_class_dyn(&mut f)
    }

    pub(crate) fn map_class_dyn(&self, f: &mut dyn FnMut(&ClassName) -> ClassName) -> TypeRef {
        match self {
            TypeRef::Primitive(kind) => TypeRef::Primitive(*kind),
            TypeRef::Array(element) => TypeRef::Array(Box::new(element.map_class_dyn(f))),
            TypeRef::Reference(name) => TypeRef::Reference(f(name)),
        }
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            TypeRef::Primitive(kind) => out.push(kind.code()),
            TypeRef::Array(element) => {
                out.push('[');
                element.write_descriptor(out);
            }
            TypeRef::Reference(name) => {
                out.push('L');
                out.push_str(name.as_str());
                out.push(';');
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

impl FromStr for TypeRef {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        TypeRef::from_descriptor(s)
    }
}

impl From<ClassName> for TypeRef {
    fn from(value: ClassName) -> Self {
        TypeRef::Reference(value)
    }
}

/// Method descriptor: `(params)return`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Descriptor {
    pub params: Vec<TypeRef>,
    pub return_type: TypeRef,
}

impl Descriptor {
    pub fn new(params: Vec<TypeRef>, return_type: TypeRef) -> Self {
        Self {
            params,
            return_type,
        }
    }

    pub fn parse(desc: &str) -> Result<Self> {
        let malformed = || TypeError::MalformedDescriptor(desc.to_string());

        let mut rest = desc.strip_prefix('(').ok_or_else(malformed)?;
        let mut params = Vec::new();
        loop {
            if let Some(after) = rest.strip_prefix(')') {
                rest = after;
                break;
            }
            let (param, after) = parse_type(rest, false).ok_or_else(malformed)?;
            params.push(param);
            rest = after;
        }

        let (return_type, rest) = parse_type(rest, true).ok_or_else(malformed)?;
        if !rest.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            params,
            return_type,
        })
    }

    pub fn map_classes(&self, mut f: impl FnMut(&ClassName) -> ClassName) -> Descriptor {
        self.map_classes_dyn(&mut f)
    }

    pub(crate) fn map_classes_dyn(
        &self,
        f: &mut dyn FnMut(&ClassName) -> ClassName,
    ) -> Descriptor {
        Descriptor {
            params: self.params.iter().map(|p| p.map_class_dyn(f)).collect(),
            return_type: self.return_type.map_class_dyn(f),
        }
    }

    /// Every class mentioned by the parameters and return type, in order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassName> {
        self.params
            .iter()
            .chain(std::iter::once(&self.return_type))
            .filter_map(TypeRef::element_class)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::from("(");
        for param in &self.params {
            param.write_descriptor(&mut out);
        }
        out.push(')');
        self.return_type.write_descriptor(&mut out);
        f.write_str(&out)
    }
}

impl FromStr for Descriptor {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        Descriptor::parse(s)
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        TypeRef::from_descriptor(&text).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Descriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Descriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Descriptor::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Most array dimensions a JVM type may carry.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

fn parse_type(input: &str, allow_void: bool) -> Option<(TypeRef, &str)> {
    let dimensions = input.bytes().take_while(|&b| b == b'[').count();
    if dimensions > MAX_ARRAY_DIMENSIONS {
        return None;
    }
    let input = &input[dimensions..];
    let code = input.chars().next()?;
    let rest = &input[code.len_utf8()..];
    let (element, rest) = match code {
        'L' => {
            let end = rest.find(';')?;
            let name = &rest[..end];
            if !is_well_formed_class_name(name) {
                return None;
            }
            (TypeRef::Reference(ClassName::new(name)), &rest[end + 1..])
        }
        'V' if !allow_void || dimensions > 0 => return None,
        _ => (TypeRef::Primitive(PrimitiveType::from_code(code)?), rest),
    };
    let ty = (0..dimensions).fold(element, |ty, _| TypeRef::Array(Box::new(ty)));
    Some((ty, rest))
}
