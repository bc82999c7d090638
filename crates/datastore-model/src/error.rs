#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("path element id must follow int64 format: {0}")]
    InvalidPathElementId(String),
    #[error("key path can never be empty")]
    EmptyKeyPath,
    #[error("key path can have at most {max} elements, got {len}")]
    KeyPathTooLong { len: usize, max: usize },
    #[error("value kind unrecognized for property `{property}`")]
    UnrecognizedValueKind { property: String },
    #[error("missing binding value: a gql query parameter needs a value or a cursor")]
    MissingBindingValue,
    #[error("ambiguous binding: a gql query parameter takes a value or a cursor, not both")]
    AmbiguousBinding,
    #[error("wire decode failed: {0}")]
    Decode(String),
}

impl ModelError {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
