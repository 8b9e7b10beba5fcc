//! Concierge Server
//!
//! HTTP host for the assistant: one orchestrator and session per
//! conversation, document upload, chat, and reset.

pub mod http;
pub mod metrics;
pub mod services;
pub mod session;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, metrics_handler, record_error};
pub use services::{IndexSummary, Services};
pub use session::{Conversation, ManagedSession, SessionManager};
pub use state::AppState;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use concierge_tools::{ErrorCode, ToolError};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Session(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServerError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Tool(e) => match e.code {
                ErrorCode::InvalidParams => StatusCode::BAD_REQUEST,
                ErrorCode::MethodNotFound => StatusCode::NOT_FOUND,
                ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServerError::Session(_) => "session",
            ServerError::NotFound(_) => "not_found",
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::Upstream(_) => "upstream",
            ServerError::Configuration(_) => "configuration",
            ServerError::Tool(_) => "tool",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        record_error(self.kind());
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
