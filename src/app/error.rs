use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwipediaError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Content parsing error: {0}")]
    ContentParse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification used by callers that only care about the failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    NotFound,
    Persistence,
    Other,
}

impl SwipediaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SwipediaError::Http(_) | SwipediaError::Network(_) | SwipediaError::ContentParse(_) => {
                ErrorKind::Network
            }
            SwipediaError::NotFound(_) => ErrorKind::NotFound,
            SwipediaError::Database(_) | SwipediaError::Storage(_) | SwipediaError::Serialization(_) => {
                ErrorKind::Persistence
            }
            _ => ErrorKind::Other,
        }
    }

    pub fn is_persistence(&self) -> bool {
        self.kind() == ErrorKind::Persistence
    }
}

pub type Result<T> = std::result::Result<T, SwipediaError>;
