// Application state management
// Contains the per-browser sessions and the page state each one carries

use crate::agents::AgentDialogState;
use crate::pages::{LoginPageState, SettingsPageState};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Sessions untouched for this long are dropped
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Unique identifier for a browser session
pub type SessionId = String;

/// A session shared between concurrent requests
///
/// The mutex serializes handlers of one session without blocking others.
pub type SharedSession = Arc<Mutex<Session>>;

/// State of one browser session
///
/// Lives only in memory; page state is reset after each save or cancel.
#[derive(Debug, Clone)]
pub struct Session {
    /// Logged-in username, empty when anonymous
    pub current_username: String,
    /// Raw agent settings text of the logged-in user
    pub agent_settings: String,
    /// API key edited on the settings page
    pub api_key: String,
    /// API key section is disabled when Vertex AI is used
    pub uses_vertex_ai: bool,
    /// Add-agent dialog on the agent list page
    pub agent_dialog: AgentDialogState,
    /// Login/register page
    pub login_page: LoginPageState,
    /// Settings page
    pub settings_page: SettingsPageState,
}

impl Session {
    /// Create an anonymous session
    pub fn new(api_key: String, uses_vertex_ai: bool) -> Self {
        Self {
            current_username: String::new(),
            agent_settings: String::new(),
            api_key,
            uses_vertex_ai,
            agent_dialog: AgentDialogState::default(),
            login_page: LoginPageState::default(),
            settings_page: SettingsPageState::default(),
        }
    }

    /// Whether a user is logged in
    pub fn is_logged_in(&self) -> bool {
        !self.current_username.is_empty()
    }
}

#[derive(Debug)]
struct SessionEntry {
    session: SharedSession,
    last_seen: DateTime<Utc>,
}

/// Main application state
/// Registry of live sessions plus the defaults new sessions start from
#[derive(Debug)]
pub struct AppState {
    /// Live sessions (id -> session)
    sessions: HashMap<SessionId, SessionEntry>,
    /// API key copied into new sessions
    default_api_key: String,
    /// Vertex AI mode copied into new sessions
    uses_vertex_ai: bool,
    /// Idle time after which a session is dropped
    idle_timeout: Duration,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_auth(String::new(), false)
    }
}

impl AppState {
    /// Create an empty application state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an application state whose sessions start with the given key settings
    pub fn with_auth(default_api_key: String, uses_vertex_ai: bool) -> Self {
        Self {
            sessions: HashMap::new(),
            default_api_key,
            uses_vertex_ai,
            idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
        }
    }

    /// Set how long a session may sit unused before it is dropped
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Issue a new anonymous session and return its id
    ///
    /// Expired sessions are pruned first.
    pub fn create_session(&mut self) -> SessionId {
        self.create_session_at(Utc::now())
    }

    fn create_session_at(&mut self, now: DateTime<Utc>) -> SessionId {
        self.prune_expired(now);

        let id = Uuid::new_v4().to_string();
        let session = Session::new(self.default_api_key.clone(), self.uses_vertex_ai);
        self.sessions.insert(
            id.clone(),
            SessionEntry {
                session: Arc::new(Mutex::new(session)),
                last_seen: now,
            },
        );
        id
    }

    /// Get a session by id and mark it as used
    ///
    /// An expired session is dropped and reported as missing.
    pub fn session(&mut self, id: &str) -> Option<SharedSession> {
        self.session_at(id, Utc::now())
    }

    fn session_at(&mut self, id: &str, now: DateTime<Utc>) -> Option<SharedSession> {
        let idle_timeout = self.idle_timeout;
        let entry = self.sessions.get_mut(id)?;
        if is_expired(entry.last_seen, now, idle_timeout) {
            self.sessions.remove(id);
            debug!(session_id = %id, "Session expired");
            return None;
        }
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    fn prune_expired(&mut self, now: DateTime<Utc>) {
        let idle_timeout = self.idle_timeout;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| !is_expired(entry.last_seen, now, idle_timeout));
        let pruned = before - self.sessions.len();
        if pruned > 0 {
            debug!(pruned, "Pruned expired sessions");
        }
    }

    /// Drop a session
    /// Returns true if the session existed
    pub fn remove_session(&mut self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

fn is_expired(last_seen: DateTime<Utc>, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
    // A clock step backwards yields a negative span, which never expires
    (now - last_seen)
        .to_std()
        .map(|idle| idle > idle_timeout)
        .unwrap_or(false)
}
