//! Delivery channel classification.
//!
//! The hosting runtime knows which channel a conversation runs on; the
//! components only need to distinguish terse SMS-like channels from richer
//! chat channels when sizing rendered content.

use serde::{Deserialize, Serialize};

/// The kind of channel a conversation is delivered over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    /// SMS-like channel: plain text, tight length limits.
    Sms,
    /// Rich chat channel: cards, images, generous length limits.
    Chat,
}

impl ChannelType {
    /// Maximum rendered section content length for this channel.
    #[must_use]
    pub fn max_content_len(&self) -> usize {
        match self {
            Self::Sms => 500,
            Self::Chat => 2000,
        }
    }

    /// Returns true if the channel supports rich content (cards, images).
    #[must_use]
    pub fn is_rich(&self) -> bool {
        matches!(self, Self::Chat)
    }
}
