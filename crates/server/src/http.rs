//! HTTP Endpoints
//!
//! REST API for the concierge assistant.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use concierge_core::{CollectedInfo, ConversationState, Turn};
use concierge_tools::{ToolExecutor, ToolOutput};

use crate::metrics::metrics_handler;
use crate::session::Conversation;
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/api/sessions", post(create_session).get(list_sessions))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/chat", post(chat))
        .route("/api/sessions/:id/reset", post(reset_session))
        .route("/api/sessions/:id/documents", post(upload_documents))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/:name", post(call_tool))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// CORS from configured origins; no origins means any origin
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    tracing::info!(count = parsed_origins.len(), "CORS configured");
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

/// Session snapshot returned by read and reset
#[derive(Debug, Serialize)]
struct SessionView {
    session_id: String,
    state: ConversationState,
    info: CollectedInfo,
    history: Vec<Turn>,
    has_documents: bool,
}

impl SessionView {
    fn of(conversation: &Conversation) -> Self {
        Self {
            session_id: conversation.session.id().to_string(),
            state: conversation.session.state(),
            info: conversation.session.info().clone(),
            history: conversation.session.history().to_vec(),
            has_documents: conversation.orchestrator.has_documents(),
        }
    }
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    let session = state.sessions.create(state.services.orchestrator())?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "session_id": session.id })),
    ))
}

async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.list();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ServerError> {
    let session = find(&state, &id)?;
    let conversation = session.lock().await;
    Ok(Json(SessionView::of(&conversation)))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if state.sessions.remove(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    state: ConversationState,
    info: CollectedInfo,
}

async fn chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    if request.message.trim().is_empty() {
        return Err(ServerError::InvalidRequest("message must not be empty".into()));
    }

    let session = find(&state, &id)?;
    let mut conversation = session.lock().await;
    let response = conversation.handle_turn(&request.message).await;

    Ok(Json(ChatResponse {
        response,
        state: conversation.session.state(),
        info: conversation.session.info().clone(),
    }))
}

/// Clear the transcript and abandon any booking in progress
async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ServerError> {
    let session = find(&state, &id)?;
    let mut conversation = session.lock().await;
    conversation.session.reset();
    tracing::info!(session_id = %id, "Session reset");
    Ok(Json(SessionView::of(&conversation)))
}

#[derive(Debug, Deserialize)]
struct DocumentsRequest {
    /// Plain text of each document
    documents: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DocumentsResponse {
    indexed: bool,
    documents: usize,
    chunks: usize,
}

/// Replace the session's document index
async fn upload_documents(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<DocumentsRequest>,
) -> Result<Json<DocumentsResponse>, ServerError> {
    let session = find(&state, &id)?;

    let (answerer, summary) = state
        .services
        .build_retrieval(&request.documents)
        .await
        .map_err(|e| ServerError::Upstream(e.to_string()))?;

    let indexed = answerer.is_some();
    session.lock().await.orchestrator.set_retrieval(answerer);

    tracing::info!(
        session_id = %id,
        documents = summary.documents,
        chunks = summary.chunks,
        "Documents indexed"
    );

    Ok(Json(DocumentsResponse {
        indexed,
        documents: summary.documents,
        chunks: summary.chunks,
    }))
}

async fn list_tools(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "tools": state.tools.list_tools() }))
}

#[derive(Debug, Deserialize)]
struct ToolCallRequest {
    arguments: serde_json::Value,
}

async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<ToolCallRequest>,
) -> Result<Json<ToolOutput>, ServerError> {
    let output = state.tools.execute(&name, request.arguments).await?;
    Ok(Json(output))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.count(),
    }))
}

fn find(
    state: &AppState,
    id: &str,
) -> Result<std::sync::Arc<crate::session::ManagedSession>, ServerError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| ServerError::NotFound(format!("Session not found: {}", id)))
}
