//! Settings page
//!
//! API key management, per-user agent settings (JSON) and the supported
//! output MIME types.

use crate::agents::client::{self, ConversationClient};
use crate::error::AppError;
use crate::state::Session;
use crate::users::UserDb;
use serde::Serialize;
use tracing::warn;

/// Output MIME types the settings page offers, as (label, value)
pub const OUTPUT_MIME_TYPE_OPTIONS: [(&str, &str); 2] =
    [("Image", "image/*"), ("Text (Plain)", "text/plain")];

/// Settings page state
#[derive(Debug, Clone, Serialize)]
pub struct SettingsPageState {
    /// Textarea content, saved only on click
    pub current_settings_text: String,
    /// Status of the last agent settings save
    pub message: String,
    /// Whether `message` reports a failure
    pub is_error: bool,
    /// Whether the last API key update succeeded
    pub api_key_update_success: bool,
    /// Selected output MIME types
    pub output_mime_types: Vec<String>,
}

impl Default for SettingsPageState {
    fn default() -> Self {
        Self {
            current_settings_text: String::new(),
            message: String::new(),
            is_error: false,
            api_key_update_success: false,
            output_mime_types: OUTPUT_MIME_TYPE_OPTIONS
                .iter()
                .map(|(_, value)| value.to_string())
                .collect(),
        }
    }
}

/// Re-serialize settings JSON with two-space indentation
pub fn format_settings(text: &str) -> Result<String, serde_json::Error> {
    let parsed: serde_json::Value = serde_json::from_str(text)?;
    serde_json::to_string_pretty(&parsed)
}

impl SettingsPageState {
    /// Fill an empty textarea from the stored settings
    ///
    /// Valid JSON is pretty-printed, anything else is shown as is.
    pub fn populate_from(&mut self, agent_settings: &str) {
        if !self.current_settings_text.is_empty() || agent_settings.is_empty() {
            return;
        }
        self.current_settings_text =
            format_settings(agent_settings).unwrap_or_else(|_| agent_settings.to_string());
    }

    /// Textarea input or blur
    pub fn on_agent_settings_input(&mut self, value: &str) {
        self.current_settings_text = value.to_string();
    }

    /// Output types selection changed
    ///
    /// Unknown values are rejected; duplicates are dropped keeping order.
    pub fn on_selection_change_output_types(&mut self, values: &[String]) -> Result<(), AppError> {
        let mut selected: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            if !OUTPUT_MIME_TYPE_OPTIONS.iter().any(|(_, known)| *known == value.as_str()) {
                return Err(AppError::InvalidRequest(format!(
                    "Unsupported output type: {}",
                    value
                )));
            }
            if !selected.contains(value) {
                selected.push(value.clone());
            }
        }
        self.output_mime_types = selected;
        Ok(())
    }

    fn report(&mut self, message: &str, is_error: bool) {
        self.message = message.to_string();
        self.is_error = is_error;
    }
}

/// "Save Agent Settings" button
pub async fn on_save_agent_settings_click(session: &mut Session, db: &UserDb) {
    if !session.is_logged_in() {
        session
            .settings_page
            .report("Error: No user logged in.", true);
        return;
    }

    let formatted = match format_settings(&session.settings_page.current_settings_text) {
        Ok(formatted) => formatted,
        Err(_) => {
            session
                .settings_page
                .report("Error: Invalid JSON format.", true);
            return;
        }
    };

    if db
        .update_agent_settings(&session.current_username, &formatted)
        .await
    {
        session.agent_settings = formatted;
        session
            .settings_page
            .report("Agent settings updated successfully!", false);
    } else {
        session
            .settings_page
            .report("Error: Failed to update agent settings on the server.", true);
    }
}

/// API key input lost focus
///
/// Refused, leaving the stored key untouched, when Vertex AI manages the key.
pub fn on_api_key_change(session: &mut Session, value: &str) -> Result<(), AppError> {
    ensure_api_key_editable(session)?;
    session.api_key = value.to_string();
    Ok(())
}

fn ensure_api_key_editable(session: &Session) -> Result<(), AppError> {
    if session.uses_vertex_ai {
        return Err(AppError::InvalidRequest(
            "API key is managed by Vertex AI".to_string(),
        ));
    }
    Ok(())
}

/// "Update" button of the API key section
///
/// Blank keys are ignored. Returns the new success flag.
pub async fn update_api_key(
    session: &mut Session,
    client: &dyn ConversationClient,
) -> Result<bool, AppError> {
    ensure_api_key_editable(session)?;

    session.settings_page.api_key_update_success = false;
    if session.api_key.trim().is_empty() {
        return Ok(false);
    }

    let updated = client::update_api_key(client, &session.api_key).await;
    if !updated {
        warn!("API key update was not accepted");
    }
    session.settings_page.api_key_update_success = updated;
    Ok(updated)
}
