use thiserror::Error;

pub type Result<T> = std::result::Result<T, CdxError>;

#[derive(Debug, Error)]
pub enum CdxError {
    #[error("Archive index unavailable (status {status})")]
    IndexUnavailable { status: u16 },

    #[error("Archive index returned malformed data: {0}")]
    IndexMalformed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
}

impl From<reqwest::Error> for CdxError {
    fn from(err: reqwest::Error) -> Self {
        CdxError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CdxError {
    fn from(err: serde_json::Error) -> Self {
        CdxError::IndexMalformed(err.to_string())
    }
}
