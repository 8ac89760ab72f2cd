//! Article-view dialog.
//!
//! Fetches the selected answer in extended mode, renders it through the
//! content-type registry, and offers the way back to the result list. Link
//! postbacks short-circuit to a plain title-and-URL reply with no fetch.

use crate::error::DialogError;
use crate::turn::{OutboundMessage, Postback, PostbackAction, Transition, TurnInput, TurnOutput};
use helpdesk_kb_client::{KnowledgeClient, RequestOptions};
use helpdesk_kb_core::{ChannelType, SessionError, SessionStore, SessionStoreExt, keys};
use helpdesk_kb_render::{AnswerPayload, RendererRegistry};
use helpdesk_kb_search::SearchVars;
use std::sync::Arc;
use tracing::{error, instrument, warn};

const INTENT_INTRO: &str = "I found the following article related to your search:";
const NOT_FOUND_REPLY: &str = "I couldn't find that article. What else can I help you with?";
const MORE_RESULTS_PROMPT: &str = "Would you like to see more search results?";
const BACK_TO_RESULTS_PROMPT: &str = "Would you like to go back to your search results?";

const AFFIRMATIVE: [&str; 6] = ["yes", "yeah", "sure", "alright", "okay", "back"];

/// The article detail-view dialog.
pub struct ViewArticleDialog {
    client: KnowledgeClient,
    vars: SearchVars,
    registry: Arc<RendererRegistry>,
}

impl ViewArticleDialog {
    /// Creates the dialog.
    #[must_use]
    pub fn new(client: KnowledgeClient, vars: SearchVars, registry: Arc<RendererRegistry>) -> Self {
        Self {
            client,
            vars,
            registry,
        }
    }

    /// Processes one turn.
    ///
    /// # Errors
    ///
    /// Returns `DialogError` on session-store failure, a missing answer id,
    /// a link postback without a link, or unparseable article content.
    /// Upstream service failures surface as the `RestError` transition (or
    /// the not-found apology), not as errors.
    #[instrument(skip_all)]
    pub async fn invoke(
        &self,
        store: &dyn SessionStore,
        input: &TurnInput,
        channel: ChannelType,
    ) -> Result<TurnOutput, DialogError> {
        if store.get(&keys::VIEW_SHOWN).await?.unwrap_or(false) {
            return Ok(Self::route_follow_up(input));
        }

        let mut output = match &input.postback {
            Some(postback) if postback.next_action == PostbackAction::GoToLink => {
                Self::link_reply(postback)?
            }
            _ => match self.fetch_and_render(store, channel).await? {
                Rendered::Article(output) => output,
                Rendered::Terminal(output) => return Ok(output),
            },
        };

        let has_results = store.get(&self.vars.has_results).await?.unwrap_or(false);
        if !has_results {
            // No list to return to; the flow ends with the article.
            output.transition = Some(Transition::Done);
            output.keep_turn = true;
            return Ok(output);
        }

        let intent_match = store.get(&keys::INTENT_MATCH).await?.unwrap_or(false);
        store.set(&keys::VIEW_SHOWN, &true).await?;
        output.push_text(if intent_match {
            MORE_RESULTS_PROMPT
        } else {
            BACK_TO_RESULTS_PROMPT
        });
        Ok(output)
    }

    /// Routes the user's answer to the follow-up prompt.
    fn route_follow_up(input: &TurnInput) -> TurnOutput {
        let Some(text) = input.text.as_deref() else {
            return TurnOutput::default();
        };
        let lowered = text.to_lowercase();
        if AFFIRMATIVE.iter().any(|word| lowered.contains(word)) {
            TurnOutput::jump(Transition::ViewResults)
        } else if lowered.contains("no") {
            TurnOutput::jump(Transition::Done)
        } else {
            TurnOutput::jump(Transition::Intent)
        }
    }

    /// External link or unsupported type: plain title and URL, no fetch.
    fn link_reply(postback: &Postback) -> Result<TurnOutput, DialogError> {
        let link = postback
            .target()
            .ok_or_else(|| DialogError::MalformedPostback {
                reason: "link postback without a link".to_string(),
            })?;
        let title = postback.article_title.as_deref().unwrap_or_default();
        let mut output = TurnOutput::default();
        output.push_text(format!("{title}\n{link}"));
        Ok(output)
    }

    async fn fetch_and_render(
        &self,
        store: &dyn SessionStore,
        channel: ChannelType,
    ) -> Result<Rendered, DialogError> {
        let answer_id =
            store
                .get(&self.vars.answer_id)
                .await?
                .ok_or_else(|| SessionError::Missing {
                    name: self.vars.answer_id.name().to_string(),
                })?;

        let url = format!(
            "content/answers/{}?mode=EXTENDED",
            urlencoding::encode(&answer_id)
        );
        let body = match self.client.content_request(&url, RequestOptions::get()).await {
            Ok(body) => body,
            Err(err) if err.is_not_found() => {
                warn!(%answer_id, "requested answer does not exist");
                let mut output = TurnOutput::default();
                output.push_text(NOT_FOUND_REPLY);
                output.transition = Some(Transition::Done);
                return Ok(Rendered::Terminal(output));
            }
            Err(err) => {
                error!(%answer_id, %err, "answer fetch failed");
                return Ok(Rendered::Terminal(TurnOutput::jump(Transition::RestError)));
            }
        };

        let payload = AnswerPayload::parse(&body).map_err(|err| {
            error!(%answer_id, %err, "article content could not be parsed");
            DialogError::Content(err)
        })?;

        let mut output = TurnOutput::default();
        if store.get(&keys::INTENT_MATCH).await?.unwrap_or(false) {
            output.push_text(INTENT_INTRO);
        }

        let portal_url = self.client.config().answer_view_url(&payload.meta.answer_id);
        let rendered = self
            .registry
            .render(&payload.meta, &payload.document, &portal_url, channel);
        output.messages.push(OutboundMessage::Article {
            sections: rendered.sections,
            article_url: rendered.article_url,
        });
        Ok(Rendered::Article(output))
    }
}

/// Whether the view step produced an article (follow-up applies) or already
/// decided the turn's outcome.
enum Rendered {
    Article(TurnOutput),
    Terminal(TurnOutput),
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_kb_client::{ScriptedTransport, TenantConfig, TokenStore};
    use helpdesk_kb_core::MemorySessionStore;
    use serde_json::json;

    fn vars() -> SearchVars {
        SearchVars::named("search_results", "answer_id", "has_results")
    }

    fn fixture() -> (ViewArticleDialog, Arc<ScriptedTransport>, MemorySessionStore) {
        let config = TenantConfig {
            content_api: "https://kb.example.com/km/api".to_string(),
            search_api: "https://kb.example.com/srt/api".to_string(),
            customer_portal: "https://portal.example.com".to_string(),
            site_name: "example".to_string(),
            integration_user_name: "integration".to_string(),
            integration_user_password: "hunter2".to_string(),
            interface_id: 1,
            locale_id: "en_US".to_string(),
        };
        let transport = Arc::new(ScriptedTransport::new());
        let tokens = Arc::new(TokenStore::new());
        tokens.insert(config.tenant_key(), "tok".to_string());
        let client = KnowledgeClient::new(config, Arc::clone(&transport) as _, tokens);
        (
            ViewArticleDialog::new(client, vars(), Arc::new(RendererRegistry::standard())),
            transport,
            MemorySessionStore::new(),
        )
    }

    fn answer_body() -> serde_json::Value {
        json!({
            "answerId": 42,
            "title": "Resetting a password",
            "documentId": "FAQ12",
            "publishDate": "2024-03-01T09:30:00Z",
            "contentType": {"referenceKey": "FAQ"},
            "xml": "<FAQ><QUESTION>How do I reset?</QUESTION><ANSWER>Use the portal.</ANSWER></FAQ>",
        })
    }

    async fn seed_answer(store: &MemorySessionStore) {
        store
            .set(&vars().answer_id, &"42".to_string())
            .await
            .expect("seed");
    }

    #[tokio::test]
    async fn renders_the_article_and_offers_the_way_back() {
        let (dialog, transport, store) = fixture();
        transport.push_response(200, answer_body());
        seed_answer(&store).await;
        store.set(&vars().has_results, &true).await.expect("seed");

        let output = dialog
            .invoke(&store, &TurnInput::default(), ChannelType::Chat)
            .await
            .expect("invoke");

        assert_eq!(output.transition, None);
        assert_eq!(output.messages.len(), 2);
        let OutboundMessage::Article {
            sections,
            article_url,
        } = &output.messages[0]
        else {
            panic!("expected an article, got {:?}", output.messages[0]);
        };
        assert_eq!(sections[0].header, "FAQ12: Resetting a password");
        assert_eq!(sections[1].header, "How do I reset?");
        assert!(article_url.contains("/a_id/42"));
        assert_eq!(
            output.messages[1],
            OutboundMessage::Text(BACK_TO_RESULTS_PROMPT.to_string())
        );
        assert_eq!(store.get(&keys::VIEW_SHOWN).await.expect("get"), Some(true));
        assert!(transport.requests()[0]
            .url
            .contains("content/answers/42?mode=EXTENDED"));
    }

    #[tokio::test]
    async fn intent_match_gets_intro_and_more_results_prompt() {
        let (dialog, transport, store) = fixture();
        transport.push_response(200, answer_body());
        seed_answer(&store).await;
        store.set(&keys::INTENT_MATCH, &true).await.expect("seed");
        store.set(&vars().has_results, &true).await.expect("seed");

        let output = dialog
            .invoke(&store, &TurnInput::default(), ChannelType::Chat)
            .await
            .expect("invoke");

        assert_eq!(
            output.messages.first(),
            Some(&OutboundMessage::Text(INTENT_INTRO.to_string()))
        );
        assert_eq!(
            output.messages.last(),
            Some(&OutboundMessage::Text(MORE_RESULTS_PROMPT.to_string()))
        );
    }

    #[tokio::test]
    async fn no_remaining_results_ends_immediately() {
        let (dialog, transport, store) = fixture();
        transport.push_response(200, answer_body());
        seed_answer(&store).await;

        let output = dialog
            .invoke(&store, &TurnInput::default(), ChannelType::Chat)
            .await
            .expect("invoke");

        assert_eq!(output.transition, Some(Transition::Done));
        assert!(output.keep_turn);
        assert_eq!(output.messages.len(), 1);
        assert_eq!(store.get(&keys::VIEW_SHOWN).await.expect("get"), None);
    }

    #[tokio::test]
    async fn missing_answer_gets_an_apology_not_an_error() {
        let (dialog, transport, store) = fixture();
        transport.push_response(404, json!({"error": {"errorCode": "OKDOM-GEN0002"}}));
        seed_answer(&store).await;

        let output = dialog
            .invoke(&store, &TurnInput::default(), ChannelType::Chat)
            .await
            .expect("invoke");

        assert_eq!(
            output.messages,
            vec![OutboundMessage::Text(NOT_FOUND_REPLY.to_string())]
        );
        assert_eq!(output.transition, Some(Transition::Done));
        assert!(!output.keep_turn);
    }

    #[tokio::test]
    async fn other_service_failures_go_to_rest_error() {
        let (dialog, transport, store) = fixture();
        transport.push_failure("connection refused");
        seed_answer(&store).await;

        let output = dialog
            .invoke(&store, &TurnInput::default(), ChannelType::Chat)
            .await
            .expect("invoke");

        assert_eq!(output.transition, Some(Transition::RestError));
        assert!(output.keep_turn);
        assert!(output.messages.is_empty());
    }

    #[tokio::test]
    async fn unparseable_content_aborts_the_turn() {
        let (dialog, transport, store) = fixture();
        let mut body = answer_body();
        body.as_object_mut().expect("object").remove("xml");
        transport.push_response(200, body);
        seed_answer(&store).await;

        let err = dialog
            .invoke(&store, &TurnInput::default(), ChannelType::Chat)
            .await
            .expect_err("parse");

        assert!(matches!(err, DialogError::Content(_)));
    }

    #[tokio::test]
    async fn link_postback_replies_without_a_fetch() {
        let (dialog, transport, store) = fixture();
        let postback = Postback {
            next_action: PostbackAction::GoToLink,
            article_index_in_list: Some(1),
            article_id_or_link: Some("https://www.example.org/howto".to_string()),
            article_link: Some("https://www.example.org/howto".to_string()),
            article_title: Some("Password tips".to_string()),
            knowledge_session_number: Some(1),
        };

        let output = dialog
            .invoke(&store, &TurnInput::postback(postback), ChannelType::Sms)
            .await
            .expect("invoke");

        assert!(transport.requests().is_empty());
        assert_eq!(
            output.messages.first(),
            Some(&OutboundMessage::Text(
                "Password tips\nhttps://www.example.org/howto".to_string()
            ))
        );
        // No results list behind a bare link press; the flow ends here.
        assert_eq!(output.transition, Some(Transition::Done));
    }

    #[tokio::test]
    async fn follow_up_routing() {
        let (dialog, _transport, store) = fixture();
        store.set(&keys::VIEW_SHOWN, &true).await.expect("seed");

        for affirmative in ["yes", "Yeah, show me", "take me BACK"] {
            let output = dialog
                .invoke(&store, &TurnInput::text(affirmative), ChannelType::Chat)
                .await
                .expect("invoke");
            assert_eq!(output.transition, Some(Transition::ViewResults));
            assert!(output.keep_turn);
        }

        let output = dialog
            .invoke(&store, &TurnInput::text("no thanks"), ChannelType::Chat)
            .await
            .expect("invoke");
        assert_eq!(output.transition, Some(Transition::Done));

        let output = dialog
            .invoke(&store, &TurnInput::text("find printer setup"), ChannelType::Chat)
            .await
            .expect("invoke");
        assert_eq!(output.transition, Some(Transition::Intent));
    }
}
