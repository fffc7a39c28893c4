/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    #[error(transparent)]
    Index(#[from] cdx_client::CdxError),

    #[error("Export failed: {0}")]
    Export(#[from] std::io::Error),
}
