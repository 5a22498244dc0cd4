//! User database operations
//!
//! Every public operation is a single statement. Failures are logged and
//! reported as `false` / `None` so callers only have to decide what to tell
//! the user.

use crate::error::AppError;
use crate::users::models::User;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info, warn};

const USERS_SCHEMA: &str = include_str!("../../migrations/001_create_users.sql");

/// Database connection pool for user accounts
pub struct UserDb {
    pool: SqlitePool,
}

impl UserDb {
    /// Open (or create) the users database and make sure the `users` table exists
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(UserDb)` if successful
    /// * `Err(AppError)` if the file, connection or schema could not be set up
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let path = Path::new(db_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to create db directory: {}", e))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(USERS_SCHEMA).execute(&pool).await?;
        info!("Users database ready at: {}", db_path);

        Ok(Self { pool })
    }

    /// Create a new user with a freshly hashed password
    ///
    /// Returns `false` if the username is taken, hashing failed, or the
    /// insert failed for any other reason.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        agent_settings: Option<&str>,
    ) -> bool {
        let password_hash = match hash_password(password).await {
            Ok(hash) => hash,
            Err(e) => {
                warn!(username = %username, error = %e, "Failed to hash password");
                return false;
            }
        };

        let result =
            sqlx::query("INSERT INTO users (username, password_hash, agent_settings) VALUES (?, ?, ?)")
                .bind(username)
                .bind(&password_hash)
                .bind(agent_settings)
                .execute(&self.pool)
                .await;

        match result {
            Ok(_) => {
                info!(username = %username, "Created user");
                true
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!(username = %username, "Username already exists");
                false
            }
            Err(e) => {
                warn!(username = %username, error = %e, "Failed to create user");
                false
            }
        }
    }

    /// Look up a user by username
    pub async fn get_user_by_username(&self, username: &str) -> Option<User> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, agent_settings FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(user) => user,
            Err(e) => {
                warn!(username = %username, error = %e, "Failed to fetch user");
                None
            }
        }
    }

    /// Check a password against the stored hash
    ///
    /// Unknown users and unreadable hashes both verify as `false`.
    pub async fn verify_password(&self, username: &str, password: &str) -> bool {
        let Some(user) = self.get_user_by_username(username).await else {
            return false;
        };
        if user.password_hash.is_empty() {
            return false;
        }

        let password = password.to_string();
        let hash = user.password_hash;
        let verified =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await;

        match verified {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                warn!(username = %username, error = %e, "Stored password hash is unreadable");
                false
            }
            Err(e) => {
                warn!(username = %username, error = %e, "Password verification task failed");
                false
            }
        }
    }

    /// Replace the agent settings of an existing user
    ///
    /// Returns `true` only if a row was updated.
    pub async fn update_agent_settings(&self, username: &str, agent_settings: &str) -> bool {
        let result = sqlx::query("UPDATE users SET agent_settings = ? WHERE username = ?")
            .bind(agent_settings)
            .bind(username)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => {
                let updated = done.rows_affected() > 0;
                debug!(username = %username, updated, "Updated agent settings");
                updated
            }
            Err(e) => {
                warn!(username = %username, error = %e, "Failed to update agent settings");
                false
            }
        }
    }

    /// Fetch the raw agent settings text of a user
    pub async fn get_agent_settings(&self, username: &str) -> Option<String> {
        self.get_user_by_username(username)
            .await
            .and_then(|user| user.agent_settings)
    }

    /// Get the database pool (for advanced operations if needed)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn hash_password(password: &str) -> anyhow::Result<String> {
    let password = password.to_string();
    let hash =
        tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST)).await??;
    Ok(hash)
}
