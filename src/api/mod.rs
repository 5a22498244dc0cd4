//! API module
//!
//! Contains HTTP request handlers for the login, agent list and settings pages

pub mod agents;
pub mod auth;
pub mod settings;
pub mod utils;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
pub use utils::{RemoteServices, RouterState, SESSION_HEADER};

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Agent console is healthy".to_string(),
    })
}

/// Build the application routes
///
/// Middleware is layered on by the binary.
pub fn create_router(state: RouterState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        // Sessions and login page
        .route("/api/sessions", post(auth::create_session))
        .route(
            "/api/sessions/current",
            axum::routing::delete(auth::delete_session),
        )
        .route("/api/login", get(auth::get_login_page).post(auth::login))
        .route("/api/register", post(auth::register))
        .route("/api/logout", post(auth::logout))
        // Agent list page
        .route("/api/agents", get(agents::list_agents))
        .route(
            "/api/agents/dialog",
            get(agents::get_dialog).patch(agents::edit_dialog),
        )
        .route("/api/agents/dialog/open", post(agents::open_dialog))
        .route("/api/agents/dialog/read", post(agents::read_agent_card))
        .route("/api/agents/dialog/save", post(agents::save_agent))
        .route("/api/agents/dialog/cancel", post(agents::cancel_dialog))
        // Settings page
        .route("/api/settings", get(settings::get_settings))
        .route("/api/settings/agent", put(settings::save_agent_settings))
        .route("/api/settings/api-key", put(settings::update_api_key))
        .route(
            "/api/settings/output-types",
            put(settings::set_output_types),
        )
        .with_state(state)
}
