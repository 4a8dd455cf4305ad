use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Slash-separated internal name of a class, e.g. `java/lang/String`.
///
/// The default package is the empty string, so `Entity` has package `""`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the last `/`, or `""` for the default package.
    pub fn package(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    pub fn simple_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Moves the class into `package`, keeping its simple name.
    pub fn with_package(&self, package: &str) -> Self {
        if package.is_empty() {
            Self::new(self.simple_name())
        } else {
            Self(format!("{package}/{}", self.simple_name()))
        }
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for ClassName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClassName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ClassName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Structural check on the text of an internal class name.
///
/// This only rejects the delimiters that would make a descriptor ambiguous;
/// identifier validity is checked separately by [`crate::is_valid_identifier`].
pub(crate) fn is_well_formed_class_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('/')
        && !name.ends_with('/')
        && !name.contains("//")
        && !name
            .chars()
            .any(|c| matches!(c, ';' | '[' | '(' | ')' | '.' | '<' | '>') || c.is_whitespace())
}
