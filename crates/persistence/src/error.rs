use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        PersistenceError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

impl PersistenceError {
    /// Convert into the core error reported by a booking sink
    pub fn into_sink_error(self) -> concierge_core::Error {
        match self {
            PersistenceError::Configuration(msg) => concierge_core::Error::Configuration(msg),
            other => concierge_core::Error::Sink(other.to_string()),
        }
    }

    /// Convert into the core error reported by a notification sender
    pub fn into_notification_error(self) -> concierge_core::Error {
        match self {
            PersistenceError::Configuration(msg) => concierge_core::Error::Configuration(msg),
            other => concierge_core::Error::Notification(other.to_string()),
        }
    }
}
