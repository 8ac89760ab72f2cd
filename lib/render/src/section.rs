//! The section model: one block of a rendered article detail view.

use helpdesk_kb_core::ChannelType;
use serde::{Deserialize, Serialize};

/// One rendered block of an article detail view.
///
/// Ephemeral: produced by a renderer, consumed by the host to build the next
/// outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Block heading.
    pub header: String,
    /// Block body text.
    pub content: String,
    /// Optional image URL; empty when the channel or content has none.
    pub image_url: String,
}

impl Section {
    /// Creates a section without an image.
    #[must_use]
    pub fn new(header: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            content: content.into(),
            image_url: String::new(),
        }
    }

    /// Creates a section with an image.
    #[must_use]
    pub fn with_image(
        header: impl Into<String>,
        content: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            header: header.into(),
            content: content.into(),
            image_url: image_url.into(),
        }
    }

    /// Caps the content length to what the channel can carry.
    ///
    /// Truncation is by character, with a trailing ellipsis when cut.
    pub fn truncate_for(&mut self, channel: ChannelType) {
        let limit = channel.max_content_len();
        if self.content.chars().count() <= limit {
            return;
        }
        let kept: String = self.content.chars().take(limit.saturating_sub(3)).collect();
        self.content = format!("{kept}...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_untouched() {
        let mut section = Section::new("Header", "short");
        section.truncate_for(ChannelType::Sms);
        assert_eq!(section.content, "short");
    }

    #[test]
    fn sms_content_is_cut_at_500() {
        let mut section = Section::new("Header", "x".repeat(600));
        section.truncate_for(ChannelType::Sms);
        assert_eq!(section.content.chars().count(), 500);
        assert!(section.content.ends_with("..."));
    }

    #[test]
    fn chat_content_is_cut_at_2000() {
        let mut section = Section::new("Header", "y".repeat(2500));
        section.truncate_for(ChannelType::Chat);
        assert_eq!(section.content.chars().count(), 2000);
        assert!(section.content.ends_with("..."));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let mut section = Section::new("Header", "é".repeat(600));
        section.truncate_for(ChannelType::Sms);
        assert_eq!(section.content.chars().count(), 500);
    }
}
