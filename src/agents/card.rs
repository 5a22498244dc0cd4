//! Agent cards
//!
//! A remote agent describes itself with a JSON card served from
//! `/.well-known/agent.json` under its address.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Path of the self-describing card, relative to the agent's address
pub const AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Organization that publishes an agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentProvider {
    /// Organization name
    pub organization: String,
    /// Optional homepage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Optional protocol features supported by an agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Streaming responses
    #[serde(default)]
    pub streaming: bool,
    /// Push notifications
    #[serde(default)]
    pub push_notifications: bool,
}

/// Self-description of a remote agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Display name
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Address the agent is served from
    #[serde(default)]
    pub url: Option<String>,
    /// Publishing organization
    #[serde(default)]
    pub provider: Option<AgentProvider>,
    /// Agent version
    #[serde(default)]
    pub version: Option<String>,
    /// Default accepted input MIME types
    #[serde(default)]
    pub default_input_modes: Vec<String>,
    /// Default produced output MIME types
    #[serde(default)]
    pub default_output_modes: Vec<String>,
    /// Supported capabilities
    #[serde(default)]
    pub capabilities: AgentCapabilities,
}

/// Errors raised while fetching an agent card
#[derive(Error, Debug)]
pub enum AgentCardError {
    /// Address was empty
    #[error("Agent address is empty")]
    EmptyAddress,

    /// Request could not be sent or completed
    #[error("Failed to reach agent at {url}: {source}")]
    Http {
        /// Card URL
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Agent answered with a non-success status
    #[error("Agent at {url} returned status {status}")]
    Status {
        /// Card URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Body was not a valid agent card
    #[error("Invalid agent card from {url}: {message}")]
    InvalidCard {
        /// Card URL
        url: String,
        /// Parse error
        message: String,
    },
}

/// Build the card URL for an agent address
///
/// Accepts bare `host:port` addresses as well as full URLs.
pub fn agent_card_url(address: &str) -> Result<String, AgentCardError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(AgentCardError::EmptyAddress);
    }

    let base = if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };

    Ok(format!("{}{}", base.trim_end_matches('/'), AGENT_CARD_PATH))
}

/// Anything that can resolve an address to an agent card
#[async_trait]
pub trait AgentCardSource: Send + Sync {
    /// Fetch the card of the agent served at `address`
    async fn fetch_card(&self, address: &str) -> Result<AgentCard, AgentCardError>;
}

/// Resolves agent cards over HTTP
#[derive(Debug, Clone)]
pub struct HttpAgentCardResolver {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpAgentCardResolver {
    /// Create a resolver sharing the given HTTP client
    pub fn new(client: reqwest::Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl AgentCardSource for HttpAgentCardResolver {
    async fn fetch_card(&self, address: &str) -> Result<AgentCard, AgentCardError> {
        let url = agent_card_url(address)?;
        tracing::debug!(url = %url, "Fetching agent card");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| AgentCardError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentCardError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| AgentCardError::Http {
                url: url.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|e| AgentCardError::InvalidCard {
            url,
            message: e.to_string(),
        })
    }
}
