//! Paginated article-list dialog.
//!
//! Shows the stored search results four at a time, mints a postback per
//! entry, and routes button presses and "see more" requests. Anything else
//! the user types is handed back to intent resolution.

use crate::error::DialogError;
use crate::turn::{
    ListEntry, OutboundMessage, Postback, PostbackAction, Transition, TurnInput, TurnOutput,
};
use helpdesk_kb_core::{SessionStore, SessionStoreExt, keys};
use helpdesk_kb_render::RendererRegistry;
use helpdesk_kb_search::{Article, SearchVars};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const PAGE_SIZE: usize = 4;

const SEE_MORE_HINT: &str =
    "You can type *see more* to see more results. Type *help* for other options.";

/// The paginated result-list dialog.
pub struct ArticleListDialog {
    vars: SearchVars,
    registry: Arc<RendererRegistry>,
    customer_portal: String,
}

impl ArticleListDialog {
    /// Creates the dialog.
    #[must_use]
    pub fn new(
        vars: SearchVars,
        registry: Arc<RendererRegistry>,
        customer_portal: impl Into<String>,
    ) -> Self {
        Self {
            vars,
            registry,
            customer_portal: customer_portal.into(),
        }
    }

    /// Processes one turn.
    ///
    /// # Errors
    ///
    /// Returns `DialogError` on session-store failure or a postback missing
    /// its navigation target.
    #[instrument(skip_all)]
    pub async fn invoke(
        &self,
        store: &dyn SessionStore,
        input: &TurnInput,
    ) -> Result<TurnOutput, DialogError> {
        if let Some(postback) = &input.postback {
            return self.handle_postback(store, postback).await;
        }

        let articles: Vec<Article> = store.get(&self.vars.results).await?.unwrap_or_default();
        let shown = store.get(&keys::LIST_SHOWN).await?.unwrap_or(false);

        if shown {
            let Some(text) = input.text.as_deref() else {
                return Ok(TurnOutput::default());
            };
            let lowered = text.to_lowercase();
            if !(lowered.contains("more") || lowered.contains("next")) {
                return Ok(TurnOutput::jump(Transition::Intent));
            }

            let cursor = store.get(&keys::LIST_START_INDEX).await?.unwrap_or(0);
            if cursor + PAGE_SIZE >= articles.len() {
                // Nothing further to page to; let intent resolution decide.
                return Ok(TurnOutput::jump(Transition::Intent));
            }
            let cursor = cursor + PAGE_SIZE;
            store.set(&keys::LIST_START_INDEX, &cursor).await?;
            self.render_page(store, &articles, cursor).await
        } else {
            let mut cursor = store.get(&keys::LIST_START_INDEX).await?.unwrap_or(0);
            if cursor >= articles.len() {
                // A cursor left over from an earlier, longer list restarts
                // at the first page.
                cursor = 0;
            }
            store.set(&keys::LIST_START_INDEX, &cursor).await?;
            let output = self.render_page(store, &articles, cursor).await?;
            store.set(&keys::LIST_SHOWN, &true).await?;
            Ok(output)
        }
    }

    async fn handle_postback(
        &self,
        store: &dyn SessionStore,
        postback: &Postback,
    ) -> Result<TurnOutput, DialogError> {
        let search_number = store.get(&keys::SEARCH_NUMBER).await?.unwrap_or(0);
        if postback.knowledge_session_number != Some(search_number) {
            // The button belongs to an earlier search; the article can still
            // be shown, but there is no list to offer a way back to.
            warn!(
                minted = ?postback.knowledge_session_number,
                current = search_number,
                "postback from a superseded search"
            );
            store.set(&self.vars.has_results, &false).await?;
        }

        let target = postback
            .target()
            .ok_or_else(|| DialogError::MalformedPostback {
                reason: "article postback without an id or link".to_string(),
            })?;
        store.set(&self.vars.answer_id, &target.to_string()).await?;
        Ok(TurnOutput::jump(Transition::ViewArticle))
    }

    async fn render_page(
        &self,
        store: &dyn SessionStore,
        articles: &[Article],
        cursor: usize,
    ) -> Result<TurnOutput, DialogError> {
        let search_number = store.get(&keys::SEARCH_NUMBER).await?.unwrap_or(0);
        let end = (cursor + PAGE_SIZE).min(articles.len());
        debug!(cursor, end, total = articles.len(), "rendering result page");

        let entries = articles[cursor..end]
            .iter()
            .enumerate()
            .map(|(offset, article)| self.entry(article, cursor + offset, search_number))
            .collect();

        let mut output = TurnOutput::default();
        output.push_text(format!(
            "Displaying the top *{}* results. Here are results *{}-{}*.",
            articles.len(),
            cursor + 1,
            end,
        ));
        output.messages.push(OutboundMessage::ArticleList {
            entries,
            start: cursor,
            total: articles.len(),
        });
        if end >= articles.len() {
            output.push_text(format!(
                "You are at the end of your search results. You can do a more detailed \
                 search at {}, or type *find* or *search* to look for another article.",
                self.customer_portal,
            ));
        } else {
            output.push_text(SEE_MORE_HINT);
        }
        Ok(output)
    }

    fn entry(&self, article: &Article, index: usize, search_number: u64) -> ListEntry {
        let postback = match &article.answer_id {
            Some(answer_id) if self.registry.supports(&article.content_type) => Postback {
                next_action: PostbackAction::GoToArticle,
                article_index_in_list: Some(index),
                article_id_or_link: Some(answer_id.clone()),
                article_link: None,
                article_title: None,
                knowledge_session_number: Some(search_number),
            },
            // External links and types without a detail renderer open as
            // plain links.
            _ => Postback {
                next_action: PostbackAction::GoToLink,
                article_index_in_list: Some(index),
                article_id_or_link: Some(article.link.clone()),
                article_link: Some(article.link.clone()),
                article_title: Some(article.title.trim().to_string()),
                knowledge_session_number: Some(search_number),
            },
        };
        ListEntry {
            title: article.title.clone(),
            excerpt: article.excerpt.clone(),
            link: article.link.clone(),
            postback,
        }
    }
}
