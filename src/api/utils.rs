//! API utility functions
//!
//! Shared router state and session lookup used by every handler.

use crate::agents::{AgentCardSource, ConversationClient};
use crate::error::AppError;
use crate::state::{AppState, SessionId, SharedSession};
use crate::users::UserDb;
use axum::http::HeaderMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Header carrying the session id issued by `POST /api/sessions`
pub const SESSION_HEADER: &str = "x-session-id";

/// Outbound services reached by page handlers
pub struct RemoteServices {
    /// Conversation host that keeps the remote agent list
    pub conversation: Arc<dyn ConversationClient>,
    /// Agent card resolver
    pub cards: Arc<dyn AgentCardSource>,
}

impl RemoteServices {
    /// Bundle the outbound services
    pub fn new(
        conversation: Arc<dyn ConversationClient>,
        cards: Arc<dyn AgentCardSource>,
    ) -> Self {
        Self {
            conversation,
            cards,
        }
    }
}

/// State shared by all routes: sessions, user store, remote services
pub type RouterState = (Arc<RwLock<AppState>>, Arc<UserDb>, Arc<RemoteServices>);

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
    /// Status indicator (e.g., "ok", "error")
    pub status: String,
}

impl MessageResponse {
    /// An "ok" message
    pub fn ok(message: &str) -> Self {
        Self {
            message: message.to_string(),
            status: "ok".to_string(),
        }
    }
}

/// Read the session id from the request headers
///
/// # Returns
/// * `Ok(SessionId)` - Header present and non-empty
/// * `Err(AppError)` - Header missing or unreadable
pub fn session_id_from_headers(headers: &HeaderMap) -> Result<SessionId, AppError> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::SessionNotFound(format!("missing {} header", SESSION_HEADER)))
}

/// Resolve the session named by the request headers
///
/// Looking a session up refreshes its idle timer. The application state lock
/// is released before returning, so callers may hold the session across
/// awaits without blocking other sessions.
pub async fn require_session(
    state: &Arc<RwLock<AppState>>,
    headers: &HeaderMap,
) -> Result<(SessionId, SharedSession), AppError> {
    let id = session_id_from_headers(headers)?;
    let session = state
        .write()
        .await
        .session(&id)
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
    Ok((id, session))
}
