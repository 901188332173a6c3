use thiserror::Error;

/// Main error type for the catalog engine
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider errors (non-success status, undecodable body, auth failure)
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    /// Requested record does not exist upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// Game is already on the user's list
    #[error("Game {game_id} is already in {list}")]
    AlreadyListed { list: String, game_id: u64 },

    /// Key-value / list storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl CatalogError {
    /// Shorthand for provider failures
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl From<String> for CatalogError {
    fn from(s: String) -> Self {
        CatalogError::Other(s)
    }
}

impl From<&str> for CatalogError {
    fn from(s: &str) -> Self {
        CatalogError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CatalogError>;
