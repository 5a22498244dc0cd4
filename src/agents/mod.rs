//! Remote agents module
//!
//! Agent cards, the conversation host client that keeps the remote agent
//! list, and the state behind the "add agent" dialog.

pub mod card;
pub mod client;
pub mod dialog;

pub use card::{AgentCard, AgentCardError, AgentCardSource, HttpAgentCardResolver};
pub use client::{
    AgentDetails, ConversationClient, ConversationError, HttpConversationClient,
    RegisterAgentRequest, RegisterParams,
};
pub use dialog::AgentDialogState;
