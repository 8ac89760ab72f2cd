//! Free-text question search.
//!
//! Posts the user's text to the natural-language search endpoint, detects
//! direct intent matches (`template` results), filters non-navigable
//! fragments, and normalizes the remainder into the article list.

use crate::article::{Article, EXTERNAL_LINK_TYPE, classify_title_url};
use crate::error::SearchError;
use crate::outcome::{SearchOutcome, SearchVars};
use crate::wire::IdValue;
use helpdesk_kb_client::{KnowledgeClient, RequestOptions};
use helpdesk_kb_core::{SessionStore, SessionStoreExt, increment_search_number, keys};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use urlencoding::encode;

/// Result item type marking a direct intent/answer match.
const TEMPLATE_TYPE: &str = "template";

#[derive(Debug, Clone, Deserialize, Default)]
struct QuestionResponse {
    #[serde(default)]
    results: Option<ResultGroups>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResultGroups {
    #[serde(default)]
    results: Vec<ResultGroup>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResultGroup {
    #[serde(rename = "resultItems", default)]
    result_items: Vec<ResultItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResultItem {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(rename = "globalAnswerId", default)]
    global_answer_id: Option<IdValue>,
    #[serde(default)]
    title: TitleField,
    #[serde(rename = "textElements", default)]
    text_elements: Vec<TextElement>,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct TitleField {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    snippets: Vec<Snippet>,
}

#[derive(Debug, Clone, Deserialize)]
struct TextElement {
    #[serde(default)]
    snippets: Vec<Snippet>,
}

#[derive(Debug, Clone, Deserialize)]
struct Snippet {
    #[serde(default)]
    text: String,
}

fn joined_snippets(snippets: &[Snippet]) -> String {
    snippets.iter().map(|s| s.text.as_str()).collect()
}

/// The free-text search orchestrator.
pub struct QuestionSearch {
    client: KnowledgeClient,
    vars: SearchVars,
}

impl QuestionSearch {
    /// Creates the orchestrator.
    #[must_use]
    pub fn new(client: KnowledgeClient, vars: SearchVars) -> Self {
        Self { client, vars }
    }

    /// Runs one free-text search and returns the next dialog state.
    ///
    /// The session search counter is incremented before the remote call.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on service, session, or classification failure.
    #[instrument(skip(self, store, query_text))]
    pub async fn invoke(
        &self,
        store: &dyn SessionStore,
        query_text: &str,
    ) -> Result<SearchOutcome, SearchError> {
        increment_search_number(store).await?;

        let url = format!("search/question?question={}", encode(query_text));
        let body = self
            .client
            .search_request(&url, RequestOptions::post(json!({})))
            .await?;
        let response: QuestionResponse =
            serde_json::from_value(body).map_err(|e| SearchError::InvalidResponse {
                reason: format!("question response: {e}"),
            })?;

        let mut items = response
            .results
            .map(|groups| groups.results)
            .and_then(|groups| groups.into_iter().next())
            .map(|group| group.result_items)
            .unwrap_or_default();

        let Some(first) = items.first() else {
            debug!("question search returned no result items");
            return Ok(SearchOutcome::NoResults);
        };

        let intent_match = first.kind.as_deref() == Some(TEMPLATE_TYPE);
        if intent_match {
            if let Some(answer_id) = &first.global_answer_id {
                store
                    .set(&self.vars.answer_id, &answer_id.to_string())
                    .await?;
            }
            store.set(&keys::INTENT_MATCH, &true).await?;
            // Template fragments without a navigable link are not displayable.
            items.retain(|item| item.title.url.is_some());
            if items.is_empty() {
                return Ok(SearchOutcome::NoResults);
            }
        }

        let articles = items
            .iter()
            .map(|item| self.to_article(item))
            .collect::<Result<Vec<_>, SearchError>>()?;
        store
            .set(&self.vars.has_results, &(articles.len() > 1))
            .await?;
        store.set(&self.vars.results, &articles).await?;

        if intent_match {
            Ok(SearchOutcome::ViewArticle { announcement: None })
        } else {
            Ok(SearchOutcome::ViewResults)
        }
    }

    fn to_article(&self, item: &ResultItem) -> Result<Article, SearchError> {
        let title = joined_snippets(&item.title.snippets);
        let excerpt: String = item
            .text_elements
            .iter()
            .map(|element| joined_snippets(&element.snippets))
            .collect();

        match &item.global_answer_id {
            Some(answer_id) => {
                let url = item.title.url.as_deref().ok_or_else(|| {
                    SearchError::InvalidResponse {
                        reason: "internal result item without a title URL".to_string(),
                    }
                })?;
                let answer_id = answer_id.to_string();
                Ok(Article {
                    title,
                    excerpt,
                    link: self.client.config().answer_view_url(&answer_id),
                    answer_id: Some(answer_id),
                    content_type: classify_title_url(url)?,
                })
            }
            None => Ok(Article {
                title,
                excerpt,
                link: item.link.clone().unwrap_or_default(),
                answer_id: None,
                content_type: EXTERNAL_LINK_TYPE.to_string(),
            }),
        }
    }
}
