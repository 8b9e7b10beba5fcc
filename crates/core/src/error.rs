//! Error types shared by collaborator traits

use thiserror::Error;

/// Result alias for collaborator calls
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by collaborators behind the core traits
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Reasoning error: {0}")]
    Reasoning(String),

    #[error("Booking sink error: {0}")]
    Sink(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
