use thiserror::Error;

pub type Result<T> = std::result::Result<T, TypeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("malformed type: {0}")]
    MalformedType(String),
    #[error("malformed method descriptor: {0}")]
    MalformedDescriptor(String),
    #[error("malformed member name (expected `owner/name`): {0}")]
    MalformedMemberName(String),
    #[error("type isn't a reference type: {0}")]
    NotAReferenceType(String),
}
