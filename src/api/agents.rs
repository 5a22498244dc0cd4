//! Agent list page API handlers
//!
//! Lists the remote agents known to the conversation host and drives the
//! add-agent dialog of the caller's session.

use crate::agents::client::list_remote_agents;
use crate::agents::dialog::SaveOutcome;
use crate::agents::{AgentCard, AgentDialogState};
use crate::api::utils::{require_session, RouterState};
use crate::error::AppError;
use axum::{extract::State, http::HeaderMap, response::Json};
use serde::{Deserialize, Serialize};

/// Agents list response
#[derive(Debug, Serialize)]
pub struct AgentsListResponse {
    /// Registered remote agents
    pub agents: Vec<AgentCard>,
    /// Total number of agents
    pub count: usize,
}

/// Dialog state plus the derived flags the page renders from
#[derive(Debug, Serialize)]
pub struct DialogResponse {
    /// Form fields
    #[serde(flatten)]
    pub dialog: AgentDialogState,
    /// Label of the address input
    pub address_label: &'static str,
    /// Whether "Read" is offered
    pub can_read: bool,
    /// Whether "Save" is offered
    pub can_save: bool,
}

impl From<&AgentDialogState> for DialogResponse {
    fn from(dialog: &AgentDialogState) -> Self {
        Self {
            dialog: dialog.clone(),
            address_label: dialog.address_label(),
            can_read: dialog.can_read(),
            can_save: dialog.can_save(),
        }
    }
}

/// Partial edit of the dialog fields
///
/// Modes are comma-separated text, exactly as typed.
#[derive(Debug, Default, Deserialize)]
pub struct EditDialogRequest {
    /// Agent address (agent name in manual mode)
    pub agent_address: Option<String>,
    /// "Test Connection Before Saving"
    pub test_connection: Option<bool>,
    /// "Manual Input"
    pub manual_input: Option<bool>,
    /// Description
    pub agent_description: Option<String>,
    /// Framework type
    pub agent_framework_type: Option<String>,
    /// Comma-separated input modes
    pub input_modes: Option<String>,
    /// Comma-separated output modes
    pub output_modes: Option<String>,
    /// "Streaming Supported"
    pub stream_supported: Option<bool>,
    /// "Push Notifications Supported"
    pub push_notifications_supported: Option<bool>,
}

impl EditDialogRequest {
    fn apply(self, dialog: &mut AgentDialogState) {
        if let Some(address) = self.agent_address {
            dialog.set_agent_address(&address);
        }
        if let Some(checked) = self.test_connection {
            dialog.set_test_connection(checked);
        }
        if let Some(checked) = self.manual_input {
            dialog.set_manual_input(checked);
        }
        if let Some(description) = self.agent_description {
            dialog.set_agent_description(&description);
        }
        if let Some(framework) = self.agent_framework_type {
            dialog.set_agent_framework_type(&framework);
        }
        if let Some(modes) = self.input_modes {
            dialog.set_input_modes(&modes);
        }
        if let Some(modes) = self.output_modes {
            dialog.set_output_modes(&modes);
        }
        if let Some(checked) = self.stream_supported {
            dialog.set_stream_supported(checked);
        }
        if let Some(checked) = self.push_notifications_supported {
            dialog.set_push_notifications_supported(checked);
        }
    }
}

/// Result of a save click
#[derive(Debug, Serialize)]
pub struct SaveAgentResponse {
    /// What happened
    pub outcome: SaveOutcome,
    /// Dialog after the click
    pub dialog: DialogResponse,
}

/// GET /api/agents - List remote agents
pub async fn list_agents(
    State((app_state, _, remote)): State<RouterState>,
    headers: HeaderMap,
) -> Result<Json<AgentsListResponse>, AppError> {
    require_session(&app_state, &headers).await?;
    let agents = list_remote_agents(remote.conversation.as_ref()).await;
    Ok(Json(AgentsListResponse {
        count: agents.len(),
        agents,
    }))
}

/// GET /api/agents/dialog - Current dialog state
pub async fn get_dialog(
    State((app_state, _, _)): State<RouterState>,
    headers: HeaderMap,
) -> Result<Json<DialogResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(DialogResponse::from(&session.agent_dialog)))
}

/// POST /api/agents/dialog/open - Show the dialog
pub async fn open_dialog(
    State((app_state, _, _)): State<RouterState>,
    headers: HeaderMap,
) -> Result<Json<DialogResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;
    session.agent_dialog.open_dialog();
    Ok(Json(DialogResponse::from(&session.agent_dialog)))
}

/// PATCH /api/agents/dialog - Apply field edits
pub async fn edit_dialog(
    State((app_state, _, _)): State<RouterState>,
    headers: HeaderMap,
    Json(request): Json<EditDialogRequest>,
) -> Result<Json<DialogResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;
    request.apply(&mut session.agent_dialog);
    Ok(Json(DialogResponse::from(&session.agent_dialog)))
}

/// POST /api/agents/dialog/read - Read the agent card at the entered address
pub async fn read_agent_card(
    State((app_state, _, remote)): State<RouterState>,
    headers: HeaderMap,
) -> Result<Json<DialogResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;
    session
        .agent_dialog
        .load_agent_info(remote.cards.as_ref())
        .await;
    Ok(Json(DialogResponse::from(&session.agent_dialog)))
}

/// POST /api/agents/dialog/save - Register the agent described by the dialog
pub async fn save_agent(
    State((app_state, _, remote)): State<RouterState>,
    headers: HeaderMap,
) -> Result<Json<SaveAgentResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;
    let outcome = session
        .agent_dialog
        .save_agent(remote.conversation.as_ref())
        .await;
    Ok(Json(SaveAgentResponse {
        outcome,
        dialog: DialogResponse::from(&session.agent_dialog),
    }))
}

/// POST /api/agents/dialog/cancel - Close the dialog and discard edits
pub async fn cancel_dialog(
    State((app_state, _, _)): State<RouterState>,
    headers: HeaderMap,
) -> Result<Json<DialogResponse>, AppError> {
    let (_, session) = require_session(&app_state, &headers).await?;
    let mut session = session.lock().await;
    session.agent_dialog.cancel_agent_dialog();
    Ok(Json(DialogResponse::from(&session.agent_dialog)))
}
