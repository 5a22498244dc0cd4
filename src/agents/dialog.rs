//! "Add remote agent" dialog state
//!
//! Holds the form behind the agent list page. Handlers mutate the form the
//! way the page's input events do; `save_agent` forwards it to the
//! conversation host and resets it on success.

use crate::agents::card::AgentCardSource;
use crate::agents::client::{add_remote_agent, AgentDetails, ConversationClient, RegisterParams};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Form state of the add-agent dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDialogState {
    /// Whether the dialog is shown
    pub agent_dialog_open: bool,
    /// Address typed by the user (the agent name in manual mode)
    pub agent_address: String,
    /// Name read from the agent card
    pub agent_name: String,
    /// Description
    pub agent_description: String,
    /// Framework or provider organization
    pub agent_framework_type: String,
    /// Input modes
    pub input_modes: Vec<String>,
    /// Output modes
    pub output_modes: Vec<String>,
    /// Streaming capability
    pub stream_supported: bool,
    /// Push notification capability
    pub push_notifications_supported: bool,
    /// Details are typed by hand
    pub manual_input: bool,
    /// Ask the host to probe the agent before saving
    pub test_connection: bool,
    /// Validation or connection error shown in the dialog
    pub error: String,
}

impl Default for AgentDialogState {
    fn default() -> Self {
        Self {
            agent_dialog_open: false,
            agent_address: String::new(),
            agent_name: String::new(),
            agent_description: String::new(),
            agent_framework_type: String::new(),
            input_modes: Vec::new(),
            output_modes: Vec::new(),
            stream_supported: false,
            push_notifications_supported: false,
            manual_input: false,
            test_connection: true,
            error: String::new(),
        }
    }
}

/// Result of a save click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Agent registered, dialog closed and reset
    Saved,
    /// Nothing to save in the current state
    Skipped,
    /// Host rejected the registration, `error` holds the message
    Failed,
}

/// Split comma-separated modes, trimming each entry
pub fn parse_modes(value: &str) -> Vec<String> {
    value.split(',').map(|mode| mode.trim().to_string()).collect()
}

impl AgentDialogState {
    /// Create a closed dialog with default fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the dialog
    pub fn open_dialog(&mut self) {
        self.agent_dialog_open = true;
    }

    /// Address input lost focus
    pub fn set_agent_address(&mut self, value: &str) {
        self.agent_address = value.to_string();
    }

    /// "Test Connection Before Saving" checkbox
    pub fn set_test_connection(&mut self, checked: bool) {
        self.test_connection = checked;
    }

    /// "Manual Input" checkbox
    pub fn set_manual_input(&mut self, checked: bool) {
        self.manual_input = checked;
    }

    /// Description input
    pub fn set_agent_description(&mut self, value: &str) {
        self.agent_description = value.to_string();
    }

    /// Framework type input
    pub fn set_agent_framework_type(&mut self, value: &str) {
        self.agent_framework_type = value.to_string();
    }

    /// Comma-separated input modes
    pub fn set_input_modes(&mut self, value: &str) {
        self.input_modes = parse_modes(value);
    }

    /// Comma-separated output modes
    pub fn set_output_modes(&mut self, value: &str) {
        self.output_modes = parse_modes(value);
    }

    /// "Streaming Supported" checkbox
    pub fn set_stream_supported(&mut self, checked: bool) {
        self.stream_supported = checked;
    }

    /// "Push Notifications Supported" checkbox
    pub fn set_push_notifications_supported(&mut self, checked: bool) {
        self.push_notifications_supported = checked;
    }

    /// Label of the address input
    pub fn address_label(&self) -> &'static str {
        if self.manual_input {
            "Agent Name (if no address)"
        } else {
            "Agent Address"
        }
    }

    /// Whether the "Read" button is offered
    pub fn can_read(&self) -> bool {
        !self.manual_input && self.agent_name.is_empty()
    }

    /// Whether the "Save" button is offered
    pub fn can_save(&self) -> bool {
        self.manual_input || (!self.agent_name.is_empty() && self.error.is_empty())
    }

    /// Read the agent card at the current address into the form
    ///
    /// Does nothing in manual mode.
    pub async fn load_agent_info(&mut self, source: &dyn AgentCardSource) {
        if self.manual_input {
            return;
        }

        self.error.clear();
        match source.fetch_card(&self.agent_address).await {
            Ok(card) => {
                self.agent_name = card.name;
                self.agent_description = card.description.unwrap_or_default();
                self.agent_framework_type = card
                    .provider
                    .map(|provider| provider.organization)
                    .unwrap_or_default();
                self.input_modes = card.default_input_modes;
                self.output_modes = card.default_output_modes;
                self.stream_supported = card.capabilities.streaming;
                self.push_notifications_supported = card.capabilities.push_notifications;
            }
            Err(e) => {
                warn!(address = %self.agent_address, error = %e, "Failed to read agent card");
                self.agent_name.clear();
                self.error = format!("Cannot connect to agent as {}", self.agent_address);
            }
        }
    }

    /// Close the dialog and discard every edit
    pub fn cancel_agent_dialog(&mut self) {
        *self = Self::default();
    }

    /// Details to register for the current form, if it is saveable
    pub fn build_agent_details(&self) -> Option<AgentDetails> {
        let address = self.agent_address.trim().to_string();

        if self.manual_input {
            return Some(AgentDetails {
                name: address.clone(),
                address,
                description: self.agent_description.clone(),
                input_modes: self.input_modes.clone(),
                output_modes: self.output_modes.clone(),
                stream_supported: self.stream_supported,
                push_notifications_supported: self.push_notifications_supported,
                framework_type: self.agent_framework_type.clone(),
                manual_input: true,
                test_connection: self.test_connection,
            });
        }

        if address.is_empty() {
            return None;
        }

        if self.error.is_empty() {
            Some(AgentDetails {
                address,
                name: self.agent_name.clone(),
                description: self.agent_description.clone(),
                input_modes: self.input_modes.clone(),
                output_modes: self.output_modes.clone(),
                stream_supported: self.stream_supported,
                push_notifications_supported: self.push_notifications_supported,
                framework_type: self.agent_framework_type.clone(),
                manual_input: false,
                test_connection: self.test_connection,
            })
        } else if !self.test_connection {
            Some(AgentDetails {
                address,
                manual_input: false,
                test_connection: false,
                ..AgentDetails::default()
            })
        } else {
            None
        }
    }

    /// Register the agent described by the form
    ///
    /// On success the form is reset and closed. On failure the dialog stays
    /// open with `error` set.
    pub async fn save_agent(&mut self, client: &dyn ConversationClient) -> SaveOutcome {
        let Some(details) = self.build_agent_details() else {
            warn!("Save requested while the agent form is not saveable");
            return SaveOutcome::Skipped;
        };

        if let Err(e) = add_remote_agent(client, RegisterParams::Details(details)).await {
            self.error = format!("Failed to save agent: {}", e);
            return SaveOutcome::Failed;
        }

        info!(address = %self.agent_address.trim(), "Registered remote agent");
        *self = Self::default();
        SaveOutcome::Saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::card::{AgentCapabilities, AgentCard, AgentCardError, AgentProvider};
    use crate::agents::client::tests::RecordingClient;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubCards {
        card: Option<AgentCard>,
        calls: AtomicUsize,
    }

    impl StubCards {
        fn with(card: AgentCard) -> Self {
            Self {
                card: Some(card),
                calls: AtomicUsize::new(0),
            }
        }

        fn unreachable() -> Self {
            Self {
                card: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AgentCardSource for StubCards {
        async fn fetch_card(&self, address: &str) -> Result<AgentCard, AgentCardError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.card.clone().ok_or_else(|| AgentCardError::Status {
                url: address.to_string(),
                status: 503,
            })
        }
    }

    fn sample_card() -> AgentCard {
        AgentCard {
            name: "TestName".to_string(),
            description: Some("TestDesc".to_string()),
            provider: Some(AgentProvider {
                organization: "TestFramework".to_string(),
                url: None,
            }),
            default_input_modes: vec!["text".to_string()],
            default_output_modes: vec!["text".to_string()],
            capabilities: AgentCapabilities {
                streaming: true,
                push_notifications: false,
            },
            ..AgentCard::default()
        }
    }

    #[test]
    fn test_initial_defaults() {
        let state = AgentDialogState::new();
        assert!(state.test_connection);
        assert!(!state.manual_input);
        assert!(!state.agent_dialog_open);
        assert!(state.input_modes.is_empty());
        assert!(state.output_modes.is_empty());
        assert_eq!(state.agent_address, "");
        assert_eq!(state.error, "");
    }

    #[test]
    fn test_toggle_checkboxes() {
        let mut state = AgentDialogState::new();
        state.set_test_connection(false);
        assert!(!state.test_connection);
        state.set_test_connection(true);
        assert!(state.test_connection);

        state.set_manual_input(true);
        assert!(state.manual_input);
        assert_eq!(state.address_label(), "Agent Name (if no address)");
        state.set_manual_input(false);
        assert_eq!(state.address_label(), "Agent Address");
    }

    #[test]
    fn test_modes_are_split_and_trimmed() {
        let mut state = AgentDialogState::new();
        state.set_input_modes("text,  image/png , audio");
        assert_eq!(state.input_modes, vec!["text", "image/png", "audio"]);
        state.set_output_modes("text");
        assert_eq!(state.output_modes, vec!["text"]);
    }

    #[tokio::test]
    async fn test_load_agent_info_skipped_in_manual_mode() {
        let cards = StubCards::with(sample_card());
        let mut state = AgentDialogState::new();
        state.set_manual_input(true);
        state.set_agent_address("http://example.com");

        state.load_agent_info(&cards).await;

        assert_eq!(cards.calls.load(Ordering::SeqCst), 0);
        assert_eq!(state.agent_name, "");
    }

    #[tokio::test]
    async fn test_load_agent_info_fills_form() {
        let cards = StubCards::with(sample_card());
        let mut state = AgentDialogState::new();
        state.set_agent_address("http://valid.url");

        state.load_agent_info(&cards).await;

        assert_eq!(state.agent_name, "TestName");
        assert_eq!(state.agent_description, "TestDesc");
        assert_eq!(state.agent_framework_type, "TestFramework");
        assert_eq!(state.input_modes, vec!["text"]);
        assert_eq!(state.output_modes, vec!["text"]);
        assert!(state.stream_supported);
        assert!(!state.push_notifications_supported);
        assert!(state.can_save());
        assert!(!state.can_read());
    }

    #[tokio::test]
    async fn test_load_agent_info_failure() {
        let cards = StubCards::unreachable();
        let mut state = AgentDialogState::new();
        state.set_agent_address("localhost:9");
        state.agent_name = "Stale".to_string();

        state.load_agent_info(&cards).await;

        assert_eq!(state.agent_name, "");
        assert_eq!(state.error, "Cannot connect to agent as localhost:9");
        assert!(!state.can_save());
    }

    #[test]
    fn test_cancel_resets_everything() {
        let mut state = AgentDialogState::new();
        state.open_dialog();
        state.set_agent_address("localhost:10000");
        state.set_manual_input(true);
        state.set_test_connection(false);
        state.set_input_modes("text");
        state.error = "boom".to_string();

        state.cancel_agent_dialog();

        assert_eq!(state, AgentDialogState::default());
    }

    #[tokio::test]
    async fn test_save_manual_agent() {
        let client = RecordingClient::default();
        let mut state = AgentDialogState::new();
        state.open_dialog();
        state.set_manual_input(true);
        state.set_agent_address("  My Agent  ");
        state.set_agent_description("Hand written");
        state.set_input_modes("text, voice");
        state.set_test_connection(false);

        let outcome = state.save_agent(&client).await;

        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(state, AgentDialogState::default());

        let registered = client.registered.lock().unwrap();
        assert_eq!(registered.len(), 1);
        match &registered[0].params {
            Some(RegisterParams::Details(details)) => {
                assert_eq!(details.name, "My Agent");
                assert_eq!(details.address, "My Agent");
                assert_eq!(details.description, "Hand written");
                assert_eq!(details.input_modes, vec!["text", "voice"]);
                assert!(details.manual_input);
                assert!(!details.test_connection);
            }
            other => panic!("Expected details params, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_loaded_agent() {
        let client = RecordingClient::default();
        let cards = StubCards::with(sample_card());
        let mut state = AgentDialogState::new();
        state.open_dialog();
        state.set_agent_address("localhost:10000");
        state.load_agent_info(&cards).await;

        assert_eq!(state.save_agent(&client).await, SaveOutcome::Saved);

        let registered = client.registered.lock().unwrap();
        match &registered[0].params {
            Some(RegisterParams::Details(details)) => {
                assert_eq!(details.address, "localhost:10000");
                assert_eq!(details.name, "TestName");
                assert_eq!(details.framework_type, "TestFramework");
                assert!(!details.manual_input);
                assert!(details.test_connection);
            }
            other => panic!("Expected details params, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_untested_address_after_failed_read() {
        let client = RecordingClient::default();
        let cards = StubCards::unreachable();
        let mut state = AgentDialogState::new();
        state.set_agent_address("localhost:10000");
        state.load_agent_info(&cards).await;
        state.set_test_connection(false);

        assert_eq!(state.save_agent(&client).await, SaveOutcome::Saved);

        let registered = client.registered.lock().unwrap();
        match &registered[0].params {
            Some(RegisterParams::Details(details)) => {
                assert_eq!(details.address, "localhost:10000");
                assert_eq!(details.name, "");
                assert!(details.input_modes.is_empty());
                assert!(!details.test_connection);
            }
            other => panic!("Expected details params, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_skipped_without_address() {
        let client = RecordingClient::default();
        let mut state = AgentDialogState::new();
        state.open_dialog();

        assert_eq!(state.save_agent(&client).await, SaveOutcome::Skipped);
        assert!(state.agent_dialog_open);
        assert!(client.registered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_keeps_dialog_open() {
        let client = RecordingClient::failing("Registration failed");
        let mut state = AgentDialogState::new();
        state.open_dialog();
        state.set_manual_input(true);
        state.set_agent_address("My Agent");

        assert_eq!(state.save_agent(&client).await, SaveOutcome::Failed);
        assert!(state.agent_dialog_open);
        assert_eq!(state.agent_address, "My Agent");
        assert!(state.error.starts_with("Failed to save agent:"));
        assert!(state.error.contains("Registration failed"));
    }
}
