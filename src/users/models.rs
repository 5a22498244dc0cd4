//! User data model
//!
//! Defines the single persisted entity: a registered user account.

use serde::Serialize;
use sqlx::FromRow;

/// A registered user
///
/// `password_hash` holds a bcrypt digest and is never serialized.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    /// Auto-incrementing identity
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// bcrypt digest of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Opaque JSON preferences (may be NULL)
    pub agent_settings: Option<String>,
}
