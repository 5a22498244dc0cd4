//! Users module
//!
//! Username/password accounts and per-user agent settings, stored in a
//! single-table SQLite database.

pub mod db;
pub mod models;

pub use db::UserDb;
pub use models::User;
