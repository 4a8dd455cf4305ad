//! Type model for JVM symbol mappings: class names, field/method descriptors
//! and the field/method identities that mapping tables are keyed by.
#![forbid(unsafe_code)]

mod descriptor;
mod error;
mod ident;
mod member;
mod name;

pub use crate::descriptor::{Descriptor, PrimitiveType, TypeRef, MAX_ARRAY_DIMENSIONS};
pub use crate::error::{Result, TypeError};
pub use crate::ident::is_valid_identifier;
pub use crate::member::{FieldId, MethodId};
pub use crate::name::ClassName;
