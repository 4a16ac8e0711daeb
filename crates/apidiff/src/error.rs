use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiDiffError>;

#[derive(Debug, Error)]
pub enum ApiDiffError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}
