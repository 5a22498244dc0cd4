//! Page handlers
//!
//! Event handlers for the login/register and settings pages. Each handler
//! mutates page state in place and reports outcomes as status text.

pub mod login;
pub mod settings;

pub use login::LoginPageState;
pub use settings::SettingsPageState;
