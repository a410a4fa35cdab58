use thiserror::Error;

/// Message shown to users for any failed fetch. Details only go to the log.
pub const GENERIC_FETCH_ERROR: &str = "There was an error";

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("GitHub API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Actor error: {0}")]
    ActorError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl BattleError {
    /// Every failure collapses to the same user-visible text.
    pub fn user_message(&self) -> &'static str {
        GENERIC_FETCH_ERROR
    }
}

pub type Result<T> = std::result::Result<T, BattleError>;
