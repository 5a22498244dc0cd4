//! Agent Console Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod pages;
/// Browser session management
///
/// Handles per-session login state and page state.
pub mod state;
pub mod users;
