//! Conversational dialogs for the helpdesk-kb components.
//!
//! This crate provides:
//!
//! - **Turn model**: Inbound text/postback, structured outbound messages,
//!   transitions with keep-turn semantics
//! - **Article list**: Paginated result presentation with per-entry postbacks
//! - **Article view**: Fetch, render, and follow-up routing for one answer

pub mod error;
pub mod list;
pub mod turn;
pub mod view;

pub use error::DialogError;
pub use list::ArticleListDialog;
pub use turn::{
    ListEntry, OutboundMessage, Postback, PostbackAction, Transition, TurnInput, TurnOutput,
};
pub use view::ViewArticleDialog;
