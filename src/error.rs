#[derive(Debug, thiserror::Error)]
pub enum PricewatchError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No price history for product: {0}")]
    EmptyHistory(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PricewatchError {
    pub fn is_validation(&self) -> bool {
        matches!(self, PricewatchError::Validation(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, PricewatchError::Storage(_))
    }

    pub fn is_empty_history(&self) -> bool {
        matches!(self, PricewatchError::EmptyHistory(_))
    }

    pub fn is_overflow(&self) -> bool {
        matches!(self, PricewatchError::Overflow(_))
    }
}

pub type Result<T> = std::result::Result<T, PricewatchError>;
