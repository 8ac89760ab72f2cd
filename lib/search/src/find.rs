//! Direct article lookup by document id or title.
//!
//! Builds a structured content query, falls back to probing the title value
//! as a document id when the user swapped the two fields, and classifies the
//! result count into the next dialog state.

use crate::article::{Article, classify_document_id};
use crate::error::SearchError;
use crate::outcome::{SearchOutcome, SearchVars};
use crate::wire::IdValue;
use helpdesk_kb_client::{KnowledgeClient, RequestOptions};
use helpdesk_kb_core::{SessionStore, SessionStoreExt, increment_search_number};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};
use urlencoding::encode;

/// The lookup request: at least one of the two fields should be set.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    /// Exact document id (`FAQ12`).
    pub document_id: Option<String>,
    /// Title substring.
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentResult {
    #[serde(rename = "documentId")]
    document_id: String,
    title: String,
    #[serde(rename = "answerId")]
    answer_id: IdValue,
    #[serde(rename = "publishDate", default)]
    publish_date: String,
}

/// The id/title lookup orchestrator.
pub struct FindArticle {
    client: KnowledgeClient,
    vars: SearchVars,
}

impl FindArticle {
    /// Creates the orchestrator.
    #[must_use]
    pub fn new(client: KnowledgeClient, vars: SearchVars) -> Self {
        Self { client, vars }
    }

    /// Runs one lookup and returns the next dialog state.
    ///
    /// The session search counter is incremented before any remote call, so
    /// postbacks minted by an earlier list render become stale.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on service, session, or classification failure;
    /// the caller maps these to the REST-error transition.
    #[instrument(skip(self, store))]
    pub async fn invoke(
        &self,
        store: &dyn SessionStore,
        query: &FindQuery,
    ) -> Result<SearchOutcome, SearchError> {
        increment_search_number(store).await?;

        let Some(initial_url) = Self::query_url(query) else {
            return Ok(SearchOutcome::NoResults);
        };

        let mut results = self.fetch(&initial_url).await?;
        if results.is_empty() {
            // The user may have entered the id in the title field and vice
            // versa; probe the title value as a document id once.
            if let (Some(_), Some(title)) = (&query.document_id, &query.title) {
                let fallback = format!("content?q=documentId+eq+'{}'", encode(title));
                debug!(url = %fallback, "no matches, retrying with swapped fields");
                results = self.fetch(&fallback).await?;
            }
            if results.is_empty() {
                return Ok(SearchOutcome::NoResults);
            }
        }

        if let [only] = results.as_slice() {
            store.set(&self.vars.has_results, &false).await?;
            store
                .set(&self.vars.answer_id, &only.answer_id.to_string())
                .await?;
            return Ok(SearchOutcome::ViewArticle {
                announcement: Some(format!("I found article {}:", only.document_id)),
            });
        }

        let articles = results
            .iter()
            .map(|result| self.to_article(result))
            .collect::<Result<Vec<_>, SearchError>>()?;
        store.set(&self.vars.has_results, &true).await?;
        store.set(&self.vars.results, &articles).await?;
        Ok(SearchOutcome::ViewResults)
    }

    fn query_url(query: &FindQuery) -> Option<String> {
        if let Some(document_id) = query.document_id.as_deref().filter(|id| !id.is_empty()) {
            Some(format!("content?q=documentId+eq+'{}'", encode(document_id)))
        } else {
            query
                .title
                .as_deref()
                .filter(|title| !title.is_empty())
                .map(|title| format!("content?q=title+likeAny+('*{}*')", encode(title)))
        }
    }

    async fn fetch(&self, relative_url: &str) -> Result<Vec<ContentResult>, SearchError> {
        let body = self
            .client
            .content_request(relative_url, RequestOptions::get())
            .await?;
        let items = body
            .get("items")
            .cloned()
            .unwrap_or(JsonValue::Array(Vec::new()));
        serde_json::from_value(items).map_err(|e| SearchError::InvalidResponse {
            reason: format!("content items: {e}"),
        })
    }

    fn to_article(&self, result: &ContentResult) -> Result<Article, SearchError> {
        let content_type = classify_document_id(&result.document_id)?;
        let answer_id = result.answer_id.to_string();
        let publish_date = result
            .publish_date
            .split('T')
            .next()
            .unwrap_or_default()
            .to_string();
        Ok(Article {
            title: format!("{}: {}", result.document_id, result.title),
            excerpt: format!("Last Published: {publish_date}"),
            link: self.client.config().answer_view_url(&answer_id),
            answer_id: Some(answer_id),
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_kb_client::{ScriptedTransport, TenantConfig, TokenStore};
    use helpdesk_kb_core::{MemorySessionStore, keys};
    use serde_json::json;
    use std::sync::Arc;

    fn vars() -> SearchVars {
        SearchVars::named("find_results", "answer_id", "has_results")
    }

    fn fixture() -> (FindArticle, Arc<ScriptedTransport>, MemorySessionStore) {
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
            FindArticle::new(client, vars()),
            transport,
            MemorySessionStore::new(),
        )
    }

    fn item(document_id: &str, answer_id: u64) -> JsonValue {
        json!({
            "documentId": document_id,
            "title": "Resetting a password",
            "answerId": answer_id,
            "publishDate": "2024-03-01T09:30:00Z",
        })
    }

    #[tokio::test]
    async fn empty_query_is_no_results_without_a_call() {
        let (find, transport, store) = fixture();

        let outcome = find
            .invoke(&store, &FindQuery::default())
            .await
            .expect("invoke");

        assert_eq!(outcome, SearchOutcome::NoResults);
        assert!(transport.requests().is_empty());
        // The counter still advances: the search attempt happened.
        assert_eq!(store.get(&keys::SEARCH_NUMBER).await.expect("get"), Some(1));
    }

    #[tokio::test]
    async fn single_result_goes_straight_to_view() {
        let (find, transport, store) = fixture();
        transport.push_response(200, json!({"items": [item("FAQ12", 42)]}));

        let query = FindQuery {
            document_id: Some("FAQ12".to_string()),
            title: None,
        };
        let outcome = find.invoke(&store, &query).await.expect("invoke");

        assert_eq!(
            outcome,
            SearchOutcome::ViewArticle {
                announcement: Some("I found article FAQ12:".to_string()),
            }
        );
        assert_eq!(
            store.get(&vars().answer_id).await.expect("get"),
            Some("42".to_string())
        );
        assert_eq!(
            store.get(&vars().has_results).await.expect("get"),
            Some(false)
        );
        let request_url = &transport.requests()[0].url;
        assert!(request_url.contains("documentId+eq+'FAQ12'"));
    }

    #[tokio::test]
    async fn multiple_results_store_the_normalized_list() {
        let (find, transport, store) = fixture();
        transport.push_response(200, json!({"items": [item("FAQ12", 42), item("SOL7", 43)]}));

        let query = FindQuery {
            document_id: None,
            title: Some("password".to_string()),
        };
        let outcome = find.invoke(&store, &query).await.expect("invoke");

        assert_eq!(outcome, SearchOutcome::ViewResults);
        assert_eq!(
            store.get(&vars().has_results).await.expect("get"),
            Some(true)
        );
        let articles = store
            .get(&vars().results)
            .await
            .expect("get")
            .expect("stored");
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "FAQ12: Resetting a password");
        assert_eq!(articles[0].excerpt, "Last Published: 2024-03-01");
        assert_eq!(articles[0].content_type, "faq");
        assert_eq!(articles[1].content_type, "sol");
        assert_eq!(articles[0].answer_id, Some("42".to_string()));
        assert!(transport.requests()[0].url.contains("title+likeAny"));
    }

    #[tokio::test]
    async fn swapped_fields_trigger_exactly_one_fallback() {
        let (find, transport, store) = fixture();
        transport.push_response(200, json!({"items": []}));
        transport.push_response(200, json!({"items": [item("FAQ12", 42)]}));

        let query = FindQuery {
            document_id: Some("Resetting a password".to_string()),
            title: Some("FAQ12".to_string()),
        };
        let outcome = find.invoke(&store, &query).await.expect("invoke");

        assert!(matches!(outcome, SearchOutcome::ViewArticle { .. }));
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        // Fallback probes the title value as a document id.
        assert!(requests[1].url.contains("documentId+eq+'FAQ12'"));
    }

    #[tokio::test]
    async fn no_results_after_fallback() {
        let (find, transport, store) = fixture();
        transport.push_response(200, json!({"items": []}));
        transport.push_response(200, json!({"items": []}));

        let query = FindQuery {
            document_id: Some("nope".to_string()),
            title: Some("also nope".to_string()),
        };
        let outcome = find.invoke(&store, &query).await.expect("invoke");

        assert_eq!(outcome, SearchOutcome::NoResults);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn malformed_document_id_is_a_classification_error() {
        let (find, transport, store) = fixture();
        transport.push_response(200, json!({"items": [item("12345", 42), item("999", 43)]}));

        let query = FindQuery {
            document_id: None,
            title: Some("password".to_string()),
        };
        let err = find.invoke(&store, &query).await.expect_err("classify");
        assert!(matches!(err, SearchError::Classification(_)));
    }

    #[tokio::test]
    async fn missing_items_field_is_invalid_response() {
        let (find, transport, store) = fixture();
        transport.push_response(200, json!({"items": "not an array"}));

        let query = FindQuery {
            document_id: Some("FAQ12".to_string()),
            title: None,
        };
        let err = find.invoke(&store, &query).await.expect_err("shape");
        assert!(matches!(err, SearchError::InvalidResponse { .. }));
    }
}
