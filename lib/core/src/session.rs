//! Session variable store abstraction.
//!
//! The hosting conversation runtime owns variable storage; dialog components
//! read and write named variables through the `SessionStore` trait. Keys are
//! typed (`VarKey<T>`), so a caller-supplied variable name is bound to its
//! value type at configuration time rather than stringly at each call site.

use crate::error::SessionError;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Mutex, PoisonError};

/// A typed key naming one session variable.
///
/// The phantom type records the value type stored under the key; reads and
/// writes go through serde, so any serializable type works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarKey<T> {
    name: Cow<'static, str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> VarKey<T> {
    /// Creates a key from a static name (reserved variables).
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _marker: PhantomData,
        }
    }

    /// Creates a key from a caller-supplied variable name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _marker: PhantomData,
        }
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Reserved variable keys shared between the dialog components.
pub mod keys {
    use super::VarKey;

    /// Monotonic per-session search counter; gates stale postbacks.
    pub const SEARCH_NUMBER: VarKey<u64> = VarKey::new("knowledge_search_number");
    /// Whether the article list has been rendered this search.
    pub const LIST_SHOWN: VarKey<bool> = VarKey::new("article_list_shown");
    /// Pagination cursor into the active article list.
    pub const LIST_START_INDEX: VarKey<usize> = VarKey::new("article_list_start_index");
    /// Whether the article view has been rendered.
    pub const VIEW_SHOWN: VarKey<bool> = VarKey::new("view_article_shown");
    /// Whether the last search matched a direct intent answer.
    pub const INTENT_MATCH: VarKey<bool> = VarKey::new("search_returned_intent_match");
}

/// Trait for the runtime's session variable storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reads a variable's raw JSON value, if set.
    async fn get_raw(&self, name: &str) -> Result<Option<JsonValue>, SessionError>;

    /// Writes a variable's raw JSON value.
    async fn set_raw(&self, name: &str, value: JsonValue) -> Result<(), SessionError>;
}

/// Typed accessors layered over any `SessionStore`.
#[async_trait]
pub trait SessionStoreExt: SessionStore {
    /// Reads a typed variable, if set.
    async fn get<T>(&self, key: &VarKey<T>) -> Result<Option<T>, SessionError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_raw(key.name()).await? {
            None => Ok(None),
            Some(raw) => serde_json::from_value(raw)
                .map(Some)
                .map_err(|e| SessionError::TypeMismatch {
                    name: key.name().to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    /// Writes a typed variable.
    async fn set<T>(&self, key: &VarKey<T>, value: &T) -> Result<(), SessionError>
    where
        T: Serialize + Send + Sync,
    {
        let raw = serde_json::to_value(value).map_err(|e| SessionError::TypeMismatch {
            name: key.name().to_string(),
            reason: e.to_string(),
        })?;
        self.set_raw(key.name(), raw).await
    }
}

impl<S: SessionStore + ?Sized> SessionStoreExt for S {}

/// Advances the per-session search counter and returns the new value.
///
/// The counter increments monotonically and wraps to 0 at `u64::MAX`, so a
/// postback minted against an earlier counter value is recognizably stale.
pub async fn increment_search_number(store: &dyn SessionStore) -> Result<u64, SessionError> {
    let current = store.get(&keys::SEARCH_NUMBER).await?.unwrap_or(0);
    let next = if current == u64::MAX { 0 } else { current + 1 };
    store.set(&keys::SEARCH_NUMBER, &next).await?;
    Ok(next)
}

/// In-memory session store.
///
/// Used by the console host and by tests; a production runtime supplies its
/// own implementation backed by conversation state.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    vars: Mutex<HashMap<String, JsonValue>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_raw(&self, name: &str) -> Result<Option<JsonValue>, SessionError> {
        // Variables are plain data; a poisoned lock is recovered, not surfaced.
        let vars = self.vars.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(vars.get(name).cloned())
    }

    async fn set_raw(&self, name: &str, value: JsonValue) -> Result<(), SessionError> {
        let mut vars = self.vars.lock().unwrap_or_else(PoisonError::into_inner);
        vars.insert(name.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn typed_get_set_roundtrip() {
        let store = MemorySessionStore::new();
        let key: VarKey<Vec<String>> = VarKey::named("results");

        store
            .set(&key, &vec!["a".to_string(), "b".to_string()])
            .await
            .expect("set");
        let values = store.get(&key).await.expect("get").expect("present");

        assert_eq!(values, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn get_unset_variable_is_none() {
        let store = MemorySessionStore::new();
        let key: VarKey<bool> = VarKey::named("missing");

        assert_eq!(store.get(&key).await.expect("get"), None);
    }

    #[tokio::test]
    async fn type_mismatch_is_reported() {
        let store = MemorySessionStore::new();
        store
            .set_raw("counter", serde_json::json!("not a number"))
            .await
            .expect("set");

        let key: VarKey<u64> = VarKey::named("counter");
        let err = store.get(&key).await.expect_err("should fail");
        assert!(matches!(err, SessionError::TypeMismatch { .. }));
    }

    #[tokio::test]
    async fn search_number_increments_from_unset() {
        let store = MemorySessionStore::new();

        assert_eq!(increment_search_number(&store).await.expect("inc"), 1);
        assert_eq!(increment_search_number(&store).await.expect("inc"), 2);
        assert_eq!(increment_search_number(&store).await.expect("inc"), 3);
    }

    #[tokio::test]
    async fn search_number_wraps_at_max() {
        let store = MemorySessionStore::new();
        store
            .set(&keys::SEARCH_NUMBER, &u64::MAX)
            .await
            .expect("seed");

        assert_eq!(increment_search_number(&store).await.expect("inc"), 0);
        assert_eq!(increment_search_number(&store).await.expect("inc"), 1);
    }
}
