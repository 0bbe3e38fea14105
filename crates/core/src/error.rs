use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocChatError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("other: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DocChatError>;

impl From<anyhow::Error> for DocChatError {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(value.to_string())
    }
}
