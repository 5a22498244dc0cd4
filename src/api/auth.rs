//! Session and login page API handlers

use crate::api::utils::{require_session, session_id_from_headers, MessageResponse, RouterState};
use crate::error::AppError;
use crate::pages::login::{self as login_page, LoginPageState};
use axum::{extract::State, http::HeaderMap, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Newly issued session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Value for the `x-session-id` header
    pub session_id: String,
}

/// Login page as seen by the browser
#[derive(Debug, Serialize)]
pub struct LoginPageResponse {
    /// Page fields and status messages
    pub login_page: LoginPageState,
    /// Logged-in username, empty when anonymous
    pub current_username: String,
}

/// Registration form submission
#[derive(Deserialize)]
pub struct RegisterRequest {
    /// Desired username
    pub username: String,
    /// Password
    pub password: String,
    /// Optional JSON agent settings
    #[serde(default)]
    pub agent_settings: Option<String>,
}

/// Login form submission
#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

/// Result of a login attempt
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Whether the session is now logged in
    pub success: bool,
    /// Page fields and status messages
    pub login_page: LoginPageState,
    /// Logged-in username, empty on failure
    pub current_username: String,
}

/// POST /api/sessions - Issue a new anonymous session
pub async fn create_session(
    State((app_state, _, _)): State<RouterState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session_id = app_state.write().await.create_session();
    info!(session_id = %session_id, "Session created");
    (StatusCode::CREATED, Json(SessionResponse { session_id }))
}

/// DELETE /api/sessions/current - Drop the caller's session
pub async fn delete_session(
    State((app_state, _, _)): State<RouterState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    let id = session_id_from_headers(&headers)?;
    if !app_state.write().await.remove_session(&id) {
        return Err(AppError::SessionNotFound(id));
    }
    Ok(Json(MessageResponse::ok("Session closed")))
}

/// GET /api/login - Current login page state
pub async fn get_login_page(
    State((app_state, _, _)): State<RouterState>,
    headers: HeaderMap,
) -> Result<Json<LoginPageResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(LoginPageResponse {
        login_page: session.login_page.clone(),
        current_username: session.current_username.clone(),
    }))
}

/// POST /api/register - Fill the registration form and click "Register"
pub async fn register(
    State((app_state, db, _)): State<RouterState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<LoginPageResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;

    let page = &mut session.login_page;
    page.reg_username = request.username;
    page.reg_password = request.password;
    page.reg_agent_settings = request.agent_settings.unwrap_or_default();
    login_page::on_register_click(page, &db).await;
    // Never keep a rejected password around
    page.reg_password.clear();

    Ok(Json(LoginPageResponse {
        login_page: session.login_page.clone(),
        current_username: session.current_username.clone(),
    }))
}

/// POST /api/login - Fill the login form and click "Login"
pub async fn login(
    State((app_state, db, _)): State<RouterState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;

    session.login_page.login_username = request.username;
    session.login_page.login_password = request.password;
    let success = login_page::on_login_click(&mut session, &db).await;
    session.login_page.login_password.clear();

    Ok(Json(LoginResponse {
        success,
        login_page: session.login_page.clone(),
        current_username: session.current_username.clone(),
    }))
}

/// POST /api/logout - Forget the logged-in user
pub async fn logout(
    State((app_state, _, _)): State<RouterState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    login_page::logout(&mut *session.lock().await);
    Ok(Json(MessageResponse::ok("Logged out")))
}
