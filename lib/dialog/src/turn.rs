//! Turn input/output model shared by the dialogs.
//!
//! A dialog receives one [`TurnInput`] (free text or a postback minted by an
//! earlier reply) and produces a [`TurnOutput`]: outbound messages plus an
//! optional transition to the next dialog state. Message formatting for a
//! concrete channel is the host's job; the dialogs emit structure only.

use helpdesk_kb_render::Section;
use serde::{Deserialize, Serialize};

/// What a postback asks the conversation to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostbackAction {
    /// Open the detail view of an internal article.
    #[serde(rename = "goToArticle")]
    GoToArticle,
    /// Present an external or unsupported article as a bare link.
    #[serde(rename = "goToLink")]
    GoToLink,
}

/// The payload carried by article-list buttons.
///
/// Serialized into the reply and round-tripped verbatim by the channel, so
/// the wire field names are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Postback {
    pub next_action: PostbackAction,
    /// Position of the article in the full result list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_index_in_list: Option<usize>,
    /// Answer id for internal articles, link for external ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id_or_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_title: Option<String>,
    /// Search counter at mint time; a mismatch marks the postback stale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_session_number: Option<u64>,
}

impl Postback {
    /// The navigation target: answer id or link, whichever was minted.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.article_id_or_link
            .as_deref()
            .or(self.article_link.as_deref())
    }
}

/// One inbound turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnInput {
    /// Free text the user typed, if any.
    pub text: Option<String>,
    /// Postback from a button the user pressed, if any.
    pub postback: Option<Postback>,
}

impl TurnInput {
    /// A free-text turn.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            postback: None,
        }
    }

    /// A postback turn.
    #[must_use]
    pub fn postback(postback: Postback) -> Self {
        Self {
            text: None,
            postback: Some(postback),
        }
    }
}

/// One entry of a rendered article-list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub title: String,
    pub excerpt: String,
    /// Direct link, used by hosts that render URL buttons.
    pub link: String,
    /// Payload for hosts that render postback buttons.
    pub postback: Postback,
}

/// A structured outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Plain text reply.
    Text(String),
    /// One page of the article list.
    ArticleList {
        /// Entries of this page only.
        entries: Vec<ListEntry>,
        /// Index of the first entry within the full list.
        start: usize,
        /// Length of the full list.
        total: usize,
    },
    /// A rendered article detail view.
    Article {
        sections: Vec<Section>,
        article_url: String,
    },
}

/// Where the conversation goes after this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Enter the article-view dialog.
    ViewArticle,
    /// Enter (or re-enter) the article-list dialog.
    ViewResults,
    /// Hand the input back to intent resolution.
    Intent,
    /// The flow is finished.
    Done,
    /// An upstream service failure; the host shows its error path.
    RestError,
}

/// The result of one dialog turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutput {
    /// Messages to send, in order.
    pub messages: Vec<OutboundMessage>,
    /// State to transition to, if the dialog is leaving its state.
    pub transition: Option<Transition>,
    /// When set, the transition target processes this same turn's input
    /// instead of waiting for the next one.
    pub keep_turn: bool,
}

impl TurnOutput {
    /// A transition that re-dispatches the current turn.
    #[must_use]
    pub fn jump(transition: Transition) -> Self {
        Self {
            messages: Vec::new(),
            transition: Some(transition),
            keep_turn: true,
        }
    }

    /// Appends a text reply.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.messages.push(OutboundMessage::Text(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn postback_wire_format_is_camel_case() {
        let postback = Postback {
            next_action: PostbackAction::GoToArticle,
            article_index_in_list: Some(2),
            article_id_or_link: Some("42".to_string()),
            article_link: None,
            article_title: None,
            knowledge_session_number: Some(7),
        };

        let wire = serde_json::to_value(&postback).expect("serialize");
        assert_eq!(
            wire,
            json!({
                "nextAction": "goToArticle",
                "articleIndexInList": 2,
                "articleIdOrLink": "42",
                "knowledgeSessionNumber": 7,
            })
        );
    }

    #[test]
    fn postback_parses_from_channel_json() {
        let postback: Postback = serde_json::from_value(json!({
            "nextAction": "goToLink",
            "articleLink": "https://www.example.org/howto",
            "articleTitle": "Password tips",
            "knowledgeSessionNumber": 3,
        }))
        .expect("deserialize");

        assert_eq!(postback.next_action, PostbackAction::GoToLink);
        assert_eq!(postback.target(), Some("https://www.example.org/howto"));
    }

    #[test]
    fn target_prefers_the_id_or_link_field() {
        let postback = Postback {
            next_action: PostbackAction::GoToLink,
            article_index_in_list: None,
            article_id_or_link: Some("primary".to_string()),
            article_link: Some("secondary".to_string()),
            article_title: None,
            knowledge_session_number: None,
        };
        assert_eq!(postback.target(), Some("primary"));
    }
}
