// State management module
// Handles browser sessions and the page state they carry

/// Session registry and per-session page state
pub mod app_state;

pub use app_state::{AppState, Session, SessionId, SharedSession};
