//! Settings page API handlers

use crate::api::utils::{require_session, RouterState};
use crate::error::AppError;
use crate::pages::settings::{self as settings_page, SettingsPageState, OUTPUT_MIME_TYPE_OPTIONS};
use crate::state::Session;
use axum::{extract::State, http::HeaderMap, response::Json};
use serde::{Deserialize, Serialize};

/// Selectable output type
#[derive(Debug, Serialize)]
pub struct OutputTypeOption {
    /// Display label
    pub label: &'static str,
    /// MIME type
    pub value: &'static str,
}

/// Settings page as seen by the browser
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    /// Logged-in username, empty when anonymous
    pub current_username: String,
    /// Page fields and status messages
    pub settings_page: SettingsPageState,
    /// Whether an API key is set (the key itself is never returned)
    pub api_key_set: bool,
    /// API key section is hidden when true
    pub uses_vertex_ai: bool,
    /// Offered output types
    pub output_type_options: Vec<OutputTypeOption>,
}

impl From<&Session> for SettingsResponse {
    fn from(session: &Session) -> Self {
        Self {
            current_username: session.current_username.clone(),
            settings_page: session.settings_page.clone(),
            api_key_set: !session.api_key.trim().is_empty(),
            uses_vertex_ai: session.uses_vertex_ai,
            output_type_options: OUTPUT_MIME_TYPE_OPTIONS
                .iter()
                .map(|&(label, value)| OutputTypeOption { label, value })
                .collect(),
        }
    }
}

/// Agent settings textarea submission
#[derive(Deserialize)]
pub struct SaveAgentSettingsRequest {
    /// Raw textarea content
    pub settings: String,
}

/// API key submission
#[derive(Deserialize)]
pub struct UpdateApiKeyRequest {
    /// New key
    pub api_key: String,
}

/// Output types selection
#[derive(Deserialize)]
pub struct OutputTypesRequest {
    /// Selected MIME types
    pub values: Vec<String>,
}

/// GET /api/settings - Settings page, textarea populated from the stored settings
pub async fn get_settings(
    State((app_state, _, _)): State<RouterState>,
    headers: HeaderMap,
) -> Result<Json<SettingsResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;
    let stored = session.agent_settings.clone();
    session.settings_page.populate_from(&stored);
    Ok(Json(SettingsResponse::from(&*session)))
}

/// PUT /api/settings/agent - Save the agent settings JSON
pub async fn save_agent_settings(
    State((app_state, db, _)): State<RouterState>,
    headers: HeaderMap,
    Json(request): Json<SaveAgentSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;
    session
        .settings_page
        .on_agent_settings_input(&request.settings);
    settings_page::on_save_agent_settings_click(&mut session, &db).await;
    Ok(Json(SettingsResponse::from(&*session)))
}

/// PUT /api/settings/api-key - Push a new API key to the conversation host
pub async fn update_api_key(
    State((app_state, _, remote)): State<RouterState>,
    headers: HeaderMap,
    Json(request): Json<UpdateApiKeyRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;
    settings_page::on_api_key_change(&mut session, &request.api_key)?;
    settings_page::update_api_key(&mut session, remote.conversation.as_ref()).await?;
    Ok(Json(SettingsResponse::from(&*session)))
}

/// PUT /api/settings/output-types - Select supported output types
pub async fn set_output_types(
    State((app_state, _, _)): State<RouterState>,
    headers: HeaderMap,
    Json(request): Json<OutputTypesRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;
    session
        .settings_page
        .on_selection_change_output_types(&request.values)?;
    Ok(Json(SettingsResponse::from(&*session)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::client::tests::RecordingClient;
    use crate::api::test_support::{create_test_router_state, new_session_headers};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_settings_require_login_to_save() {
        let (state, _temp_dir) =
            create_test_router_state(Arc::new(RecordingClient::default()), None).await;
        let headers = new_session_headers(&state).await;

        let response = save_agent_settings(
            State(state),
            headers,
            Json(SaveAgentSettingsRequest {
                settings: "{}".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.settings_page.message, "Error: No user logged in.");
        assert!(response.settings_page.is_error);
    }

    #[tokio::test]
    async fn test_get_settings_populates_textarea() {
        let (state, _temp_dir) =
            create_test_router_state(Arc::new(RecordingClient::default()), None).await;
        let headers = new_session_headers(&state).await;
        {
            let (_, session) = require_session(&state.0, &headers).await.unwrap();
            let mut session = session.lock().await;
            session.current_username = "alice".to_string();
            session.agent_settings = r#"{"theme":"dark"}"#.to_string();
        }

        let response = get_settings(State(state), headers).await.unwrap();
        assert_eq!(
            response.settings_page.current_settings_text,
            "{\n  \"theme\": \"dark\"\n}"
        );
        assert_eq!(response.output_type_options.len(), 2);
    }

    #[tokio::test]
    async fn test_update_api_key_forwards_to_host() {
        let client = Arc::new(RecordingClient::default());
        let (state, _temp_dir) = create_test_router_state(client.clone(), None).await;
        let headers = new_session_headers(&state).await;

        let response = update_api_key(
            State(state),
            headers,
            Json(UpdateApiKeyRequest {
                api_key: "fresh-key".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(response.api_key_set);
        assert!(response.settings_page.api_key_update_success);
        assert_eq!(
            *client.api_keys.lock().unwrap(),
            vec!["fresh-key".to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_api_key_with_vertex_ai_keeps_stored_key() {
        let client = Arc::new(RecordingClient::default());
        let (state, _temp_dir) = create_test_router_state(client.clone(), None).await;
        let headers = new_session_headers(&state).await;
        let (_, session) = require_session(&state.0, &headers).await.unwrap();
        {
            let mut session = session.lock().await;
            session.uses_vertex_ai = true;
            session.api_key = "vertex-managed".to_string();
        }

        let result = update_api_key(
            State(state),
            headers,
            Json(UpdateApiKeyRequest {
                api_key: "fresh-key".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(session.lock().await.api_key, "vertex-managed");
        assert!(client.api_keys.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_output_types_rejects_unknown() {
        let (state, _temp_dir) =
            create_test_router_state(Arc::new(RecordingClient::default()), None).await;
        let headers = new_session_headers(&state).await;

        let result = set_output_types(
            State(state),
            headers,
            Json(OutputTypesRequest {
                values: vec!["application/zip".to_string()],
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }
}
