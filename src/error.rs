use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("issue key not found (looked in: {})", .sources.join(", "))]
    KeyNotFound { sources: Vec<&'static str> },
    #[error("code host error: {0}")]
    CodeHost(String),
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
