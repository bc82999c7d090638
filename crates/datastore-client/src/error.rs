use datastore_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("auth token unavailable: {0}")]
    Auth(String),
    #[error("transport failure: {0}")]
    Transport(String),
    /// Non-2xx response. The body is passed through as the service sent it.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response decode failed: {0}")]
    Decode(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
