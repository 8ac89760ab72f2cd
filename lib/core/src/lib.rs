//! Core domain types and utilities for the helpdesk-kb components.
//!
//! This crate provides the foundational types shared by the knowledge-base
//! dialog components:
//!
//! - **Session store**: Typed access to runtime-owned conversation variables
//! - **Channel type**: SMS vs. rich-chat sizing decisions
//! - **Typed IDs**: ULID-backed identifiers for sessions and turns

pub mod channel;
pub mod error;
pub mod id;
pub mod session;

pub use channel::ChannelType;
pub use error::SessionError;
pub use id::{ConversationSessionId, TurnId};
pub use session::{
    MemorySessionStore, SessionStore, SessionStoreExt, VarKey, increment_search_number, keys,
};
