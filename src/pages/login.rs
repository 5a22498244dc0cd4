//! Login and registration page

use crate::state::Session;
use crate::users::UserDb;
use serde::Serialize;
use tracing::info;

/// Form and status fields of the login/register page
///
/// Passwords are held only until the next click and never serialized.
#[derive(Clone, Default, Serialize)]
pub struct LoginPageState {
    /// Registration username
    pub reg_username: String,
    /// Registration password
    #[serde(skip_serializing)]
    pub reg_password: String,
    /// Optional JSON settings supplied at registration
    pub reg_agent_settings: String,
    /// Outcome of the last registration attempt
    pub registration_status: String,

    /// Login username
    pub login_username: String,
    /// Login password
    #[serde(skip_serializing)]
    pub login_password: String,
    /// Outcome of the last login attempt
    pub login_status: String,
}

impl std::fmt::Debug for LoginPageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginPageState")
            .field("reg_username", &self.reg_username)
            .field("registration_status", &self.registration_status)
            .field("login_username", &self.login_username)
            .field("login_status", &self.login_status)
            .finish_non_exhaustive()
    }
}

/// "Register" button
pub async fn on_register_click(page: &mut LoginPageState, db: &UserDb) {
    if page.reg_username.is_empty() || page.reg_password.is_empty() {
        page.registration_status = "Username and password are required.".to_string();
        return;
    }

    let agent_settings = page.reg_agent_settings.trim();
    if !agent_settings.is_empty()
        && serde_json::from_str::<serde_json::Value>(agent_settings).is_err()
    {
        page.registration_status = "Agent settings must be valid JSON.".to_string();
        return;
    }
    let agent_settings = (!agent_settings.is_empty()).then_some(agent_settings);

    if db
        .create_user(&page.reg_username, &page.reg_password, agent_settings)
        .await
    {
        page.registration_status = format!(
            "User '{}' created successfully! You can now log in.",
            page.reg_username
        );
        page.reg_username.clear();
        page.reg_password.clear();
        page.reg_agent_settings.clear();
    } else {
        page.registration_status = format!(
            "Failed to create user '{}'. Username might already exist.",
            page.reg_username
        );
    }
}

/// "Login" button
///
/// Returns true when the session is now logged in.
pub async fn on_login_click(session: &mut Session, db: &UserDb) -> bool {
    let page = &mut session.login_page;
    if page.login_username.is_empty() || page.login_password.is_empty() {
        page.login_status = "Username and password are required.".to_string();
        return false;
    }

    if db
        .verify_password(&page.login_username, &page.login_password)
        .await
    {
        let username = std::mem::take(&mut page.login_username);
        page.login_password.clear();
        page.login_status = "Login successful!".to_string();

        session.agent_settings = db.get_agent_settings(&username).await.unwrap_or_default();
        session.settings_page.current_settings_text.clear();
        info!(username = %username, "User logged in");
        session.current_username = username;
        true
    } else {
        page.login_status = "Login failed. Please check your username and password.".to_string();
        session.current_username.clear();
        session.agent_settings.clear();
        false
    }
}

/// Forget the logged-in user and all page state
pub fn logout(session: &mut Session) {
    if session.is_logged_in() {
        info!(username = %session.current_username, "User logged out");
    }
    session.current_username.clear();
    session.agent_settings.clear();
    session.login_page = LoginPageState::default();
    session.settings_page = Default::default();
    session.agent_dialog = Default::default();
}
