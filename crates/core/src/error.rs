use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("empty response from {0}")]
    EmptyResponse(String),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
}

impl ServiceError {
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Http(error) => error
                .status()
                .map(|status| status.as_u16() == 429 || status.is_server_error())
                .unwrap_or(true),
            ServiceError::BackendResponse { details, .. } => {
                details.starts_with("429") || details.starts_with('5')
            }
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid budget config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type Result<T, E = ResearchError> = std::result::Result<T, E>;
