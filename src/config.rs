//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Remote services (conversation host, agent cards)
    pub remote: RemoteConfig,
    /// API key configuration
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
    /// Idle time (in seconds) after which a browser session is dropped
    pub session_idle_secs: u64,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Path of the SQLite users database
    pub database_path: String,
}

/// Remote service configuration
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the conversation host that owns the remote agent list
    pub conversation_server_url: String,
    /// Timeout for outbound requests (in seconds)
    pub request_timeout_secs: u64,
}

/// API key configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// When set, the API key section of the settings page is disabled
    pub uses_vertex_ai: bool,
    /// Key copied into every new session
    pub default_api_key: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("uses_vertex_ai", &self.uses_vertex_ai)
            .field("default_api_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(12000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                session_idle_secs: env::var("SESSION_IDLE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            },
            persistence: PersistenceConfig {
                database_path: env::var("DATABASE_PATH")
                    .unwrap_or_else(|_| "users.db".to_string()),
            },
            remote: RemoteConfig {
                conversation_server_url: env::var("CONVERSATION_SERVER_URL")
                    .unwrap_or_else(|_| "http://localhost:12000".to_string()),
                request_timeout_secs: env::var("REMOTE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(10),
            },
            auth: AuthConfig {
                uses_vertex_ai: env::var("GOOGLE_GENAI_USE_VERTEXAI")
                    .map(|v| parse_flag(&v))
                    .unwrap_or(false),
                default_api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
            },
        }
    }

    /// Idle timeout for browser sessions
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.server.session_idle_secs)
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_uppercase().as_str(), "TRUE" | "1")
}
