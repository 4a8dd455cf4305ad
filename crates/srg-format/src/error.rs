use srg_mappings::MappingsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FormatError>;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed mappings line {line_number}: `{line}`")]
    MalformedLine { line_number: usize, line: String },
    #[error("invalid entry on line {line_number}: `{line}`")]
    InvalidEntry {
        line_number: usize,
        line: String,
        #[source]
        source: MappingsError,
    },
    #[error("unknown mappings format `{0}` (expected `srg` or `csrg`)")]
    UnknownFormat(String),
    #[error(transparent)]
    Mappings(#[from] MappingsError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FormatError {
    /// 1-based line number of the offending input, for line-level errors.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            FormatError::MalformedLine { line_number, .. }
            | FormatError::InvalidEntry { line_number, .. } => Some(*line_number),
            _ => None,
        }
    }
}
