//! Conversation host client
//!
//! The conversation host owns the list of registered remote agents. It is
//! reached through JSON-RPC style envelopes POSTed to `{base_url}/{method}`.

use crate::agents::card::AgentCard;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Method name for agent registration
pub const REGISTER_AGENT_METHOD: &str = "agent/register";
/// Method name for listing registered agents
pub const LIST_AGENTS_METHOD: &str = "agent/list";
/// Method name for replacing the host's API key
pub const UPDATE_API_KEY_METHOD: &str = "api_key/update";

/// Full description of an agent being registered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDetails {
    /// Display name
    pub name: String,
    /// Network address, or a unique id for manually entered agents
    pub address: String,
    /// Description
    pub description: String,
    /// Accepted input modes
    pub input_modes: Vec<String>,
    /// Produced output modes
    pub output_modes: Vec<String>,
    /// Streaming capability
    pub stream_supported: bool,
    /// Push notification capability
    pub push_notifications_supported: bool,
    /// Framework or publishing organization
    pub framework_type: String,
    /// Details were typed by hand instead of read from a card
    pub manual_input: bool,
    /// Host may probe the agent before accepting it
    pub test_connection: bool,
}

/// Parameters of a registration: a bare address or full details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegisterParams {
    /// Address only, the host resolves the card itself
    Address(String),
    /// Explicit details
    Details(AgentDetails),
}

/// `agent/register` request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterAgentRequest {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// Request id
    pub id: String,
    /// Always `agent/register`
    pub method: String,
    /// Address or details of the agent
    pub params: Option<RegisterParams>,
}

impl RegisterAgentRequest {
    /// Build a registration request
    pub fn new(params: Option<RegisterParams>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Uuid::new_v4().to_string(),
            method: REGISTER_AGENT_METHOD.to_string(),
            params,
        }
    }
}

#[derive(Debug, Serialize)]
struct RpcEnvelope<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct ApiKeyParams<'a> {
    api_key: &'a str,
}

/// Errors returned by the conversation host
#[derive(Error, Debug)]
pub enum ConversationError {
    /// Transport failure
    #[error("Failed to reach conversation host: {0}")]
    Http(#[from] reqwest::Error),

    /// Host answered with a non-success status
    #[error("Conversation host returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Host answered with an RPC error member
    #[error("Conversation host error {code}: {message}")]
    Rpc {
        /// RPC error code
        code: i64,
        /// RPC error message
        message: String,
    },

    /// Response body could not be decoded
    #[error("Invalid response from conversation host: {0}")]
    InvalidResponse(String),
}

/// Operations offered by the conversation host
#[async_trait]
pub trait ConversationClient: Send + Sync {
    /// Register a remote agent
    async fn register_agent(&self, request: RegisterAgentRequest) -> Result<(), ConversationError>;

    /// List registered remote agents
    async fn list_agents(&self) -> Result<Vec<AgentCard>, ConversationError>;

    /// Replace the API key used by the host
    async fn update_api_key(&self, api_key: &str) -> Result<bool, ConversationError>;
}

/// HTTP implementation of [`ConversationClient`]
#[derive(Debug, Clone)]
pub struct HttpConversationClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpConversationClient {
    /// Create a client for the host at `base_url`
    pub fn new(client: reqwest::Client, base_url: &str, timeout_secs: u64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn send<P, R>(&self, method: &str, params: P) -> Result<Option<R>, ConversationError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let envelope = RpcEnvelope {
            jsonrpc: "2.0",
            id: Uuid::new_v4().to_string(),
            method,
            params,
        };
        self.post(method, &envelope).await
    }

    async fn post<B, R>(&self, method: &str, body: &B) -> Result<Option<R>, ConversationError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        tracing::debug!(url = %url, method = %method, "Calling conversation host");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!(
                status_code = status.as_u16(),
                error_body = %text,
                "Conversation host returned error status"
            );
            return Err(ConversationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        let parsed: RpcResponse<R> = serde_json::from_str(&text)
            .map_err(|e| ConversationError::InvalidResponse(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(ConversationError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(parsed.result)
    }
}

#[async_trait]
impl ConversationClient for HttpConversationClient {
    async fn register_agent(&self, request: RegisterAgentRequest) -> Result<(), ConversationError> {
        self.post::<_, serde_json::Value>(&request.method, &request)
            .await?;
        Ok(())
    }

    async fn list_agents(&self) -> Result<Vec<AgentCard>, ConversationError> {
        let agents: Option<Vec<AgentCard>> = self.send(LIST_AGENTS_METHOD, ()).await?;
        Ok(agents.unwrap_or_default())
    }

    async fn update_api_key(&self, api_key: &str) -> Result<bool, ConversationError> {
        self.send::<_, serde_json::Value>(UPDATE_API_KEY_METHOD, ApiKeyParams { api_key })
            .await?;
        Ok(true)
    }
}

/// Register a remote agent with the host
///
/// Client failures are logged and passed back to the caller.
pub async fn add_remote_agent(
    client: &dyn ConversationClient,
    params: RegisterParams,
) -> Result<(), ConversationError> {
    let request = RegisterAgentRequest::new(Some(params));
    client.register_agent(request).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to register remote agent");
        e
    })
}

/// List remote agents, or an empty list if the host cannot be reached
pub async fn list_remote_agents(client: &dyn ConversationClient) -> Vec<AgentCard> {
    match client.list_agents().await {
        Ok(agents) => agents,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list remote agents");
            Vec::new()
        }
    }
}

/// Push a new API key to the host, reporting failure as `false`
pub async fn update_api_key(client: &dyn ConversationClient, api_key: &str) -> bool {
    match client.update_api_key(api_key).await {
        Ok(updated) => updated,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to update API key");
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serial_test::serial;
    use std::sync::Mutex;

    /// In-memory host that records registrations
    #[derive(Default)]
    pub(crate) struct RecordingClient {
        pub registered: Mutex<Vec<RegisterAgentRequest>>,
        pub api_keys: Mutex<Vec<String>>,
        pub fail_with: Option<String>,
    }

    impl RecordingClient {
        pub(crate) fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), ConversationError> {
            match &self.fail_with {
                Some(message) => Err(ConversationError::Rpc {
                    code: -32000,
                    message: message.clone(),
                }),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ConversationClient for RecordingClient {
        async fn register_agent(
            &self,
            request: RegisterAgentRequest,
        ) -> Result<(), ConversationError> {
            self.check()?;
            self.registered.lock().unwrap().push(request);
            Ok(())
        }

        async fn list_agents(&self) -> Result<Vec<AgentCard>, ConversationError> {
            self.check()?;
            Ok(Vec::new())
        }

        async fn update_api_key(&self, api_key: &str) -> Result<bool, ConversationError> {
            self.check()?;
            self.api_keys.lock().unwrap().push(api_key.to_string());
            Ok(true)
        }
    }

    fn manual_details() -> AgentDetails {
        AgentDetails {
            name: "MyManualAgent".to_string(),
            address: "manual_agent_id_123".to_string(),
            description: "A manually configured agent.".to_string(),
            input_modes: vec!["text".to_string(), "voice".to_string()],
            output_modes: vec!["text".to_string()],
            stream_supported: true,
            push_notifications_supported: false,
            framework_type: "CustomFramework".to_string(),
            manual_input: true,
            test_connection: false,
        }
    }

    #[test]
    fn test_register_request_with_address() {
        let params = RegisterParams::Address("http://localhost:1234".to_string());
        let request = RegisterAgentRequest::new(Some(params.clone()));
        assert_eq!(request.method, "agent/register");
        assert_eq!(request.params, Some(params));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["params"], "http://localhost:1234");
    }

    #[test]
    fn test_register_request_with_details() {
        let request = RegisterAgentRequest::new(Some(RegisterParams::Details(manual_details())));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["method"], "agent/register");
        let params = json["params"].as_object().unwrap();
        for key in [
            "name",
            "address",
            "description",
            "input_modes",
            "output_modes",
            "stream_supported",
            "push_notifications_supported",
            "framework_type",
            "manual_input",
            "test_connection",
        ] {
            assert!(params.contains_key(key), "missing key {}", key);
        }
        assert_eq!(params["input_modes"], serde_json::json!(["text", "voice"]));
    }

    #[test]
    fn test_register_request_without_params() {
        let request = RegisterAgentRequest::new(None);
        assert_eq!(request.method, "agent/register");
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["params"].is_null());
    }

    #[test]
    fn test_register_params_deserialize_untagged() {
        let address: RegisterParams = serde_json::from_str(r#""localhost:10000""#).unwrap();
        assert_eq!(address, RegisterParams::Address("localhost:10000".to_string()));

        let json = serde_json::to_string(&manual_details()).unwrap();
        let details: RegisterParams = serde_json::from_str(&json).unwrap();
        assert_eq!(details, RegisterParams::Details(manual_details()));
    }

    #[tokio::test]
    async fn test_add_remote_agent_forwards_params() {
        let client = RecordingClient::default();
        let params = RegisterParams::Details(manual_details());

        add_remote_agent(&client, params.clone()).await.unwrap();

        let registered = client.registered.lock().unwrap();
        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].method, "agent/register");
        assert_eq!(registered[0].params, Some(params));
    }

    #[tokio::test]
    async fn test_add_remote_agent_propagates_errors() {
        let client = RecordingClient::failing("Registration failed");
        let result =
            add_remote_agent(&client, RegisterParams::Address("localhost:1".to_string())).await;
        assert!(result.unwrap_err().to_string().contains("Registration failed"));
    }

    #[tokio::test]
    async fn test_list_remote_agents_swallows_errors() {
        let client = RecordingClient::failing("down");
        assert!(list_remote_agents(&client).await.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_http_register_agent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/agent/register")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "jsonrpc": "2.0",
                "method": "agent/register",
                "params": "localhost:10000"
            })))
            .with_status(200)
            .with_body(r#"{"jsonrpc": "2.0", "id": "1", "result": null}"#)
            .create_async()
            .await;

        let client = HttpConversationClient::new(reqwest::Client::new(), &server.url(), 5);
        let request =
            RegisterAgentRequest::new(Some(RegisterParams::Address("localhost:10000".to_string())));
        client.register_agent(request).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn test_http_register_agent_rpc_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/agent/register")
            .with_status(200)
            .with_body(
                r#"{"jsonrpc": "2.0", "id": "1", "error": {"code": -32602, "message": "bad agent"}}"#,
            )
            .create_async()
            .await;

        let client = HttpConversationClient::new(reqwest::Client::new(), &server.url(), 5);
        let result = client.register_agent(RegisterAgentRequest::new(None)).await;

        mock.assert_async().await;
        match result {
            Err(ConversationError::Rpc { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "bad agent");
            }
            other => panic!("Expected Rpc error, got: {:?}", other),
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_http_list_agents() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/agent/list")
            .with_status(200)
            .with_body(
                r#"{"jsonrpc": "2.0", "id": "1", "result": [
                    {"name": "Reimbursement Agent", "capabilities": {"streaming": true}},
                    {"name": "Currency Agent"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = HttpConversationClient::new(reqwest::Client::new(), &server.url(), 5);
        let agents = client.list_agents().await.unwrap();

        mock.assert_async().await;
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name, "Reimbursement Agent");
        assert!(agents[0].capabilities.streaming);
    }

    #[tokio::test]
    #[serial]
    async fn test_http_update_api_key_server_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api_key/update")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "params": {"api_key": "new-key"}
            })))
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let client = HttpConversationClient::new(reqwest::Client::new(), &server.url(), 5);
        assert!(!update_api_key(&client, "new-key").await);

        mock.assert_async().await;
    }
}
