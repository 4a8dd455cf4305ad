use srg_types::TypeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MappingsError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingsError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("remapped {kind} `{renamed}` doesn't correspond to the types of `{original}`")]
    InconsistentMapping {
        kind: &'static str,
        original: String,
        renamed: String,
    },
    #[error("rule-based mappings can't be inverted")]
    NotInvertible,
    #[error("rule-based mappings can't be snapshotted")]
    NotSnapshottable,
}
