//! Process-wide integration token cache.
//!
//! One entry per tenant, shared by every conversation configured against the
//! same backend. Each entry owns at most one renewal timer; storing a fresh
//! token for a tenant aborts the previous timer. Entries carry a generation
//! counter so a superseded timer that still fires performs a no-op.

use crate::config::TenantKey;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::debug;

/// How long a token is used before the store proactively renews it.
pub const TOKEN_RENEWAL_INTERVAL: Duration = Duration::from_secs(23 * 60 * 60);

#[derive(Debug)]
struct TokenEntry {
    token: String,
    generation: u64,
    acquired_at: DateTime<Utc>,
    renewal: Option<AbortHandle>,
}

/// Concurrency-safe token cache keyed by tenant.
///
/// Lives from process start to process end; inject one shared instance into
/// every `KnowledgeClient`.
#[derive(Debug, Default)]
pub struct TokenStore {
    entries: Mutex<HashMap<TenantKey, TokenEntry>>,
    next_generation: AtomicU64,
}

impl TokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token for a tenant, if any.
    #[must_use]
    pub fn token(&self, key: &TenantKey) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(|entry| entry.token.clone())
    }

    /// Returns the generation of the tenant's current entry, if any.
    #[must_use]
    pub fn generation(&self, key: &TenantKey) -> Option<u64> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(|entry| entry.generation)
    }

    /// When the tenant's current token was acquired, if any.
    #[must_use]
    pub fn acquired_at(&self, key: &TenantKey) -> Option<DateTime<Utc>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(|entry| entry.acquired_at)
    }

    /// Stores a freshly acquired token, replacing any previous entry.
    ///
    /// The previous entry's renewal timer is aborted. Returns the generation
    /// assigned to the new entry.
    pub fn insert(&self, key: TenantKey, token: String) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let entry = TokenEntry {
            token,
            generation,
            acquired_at: Utc::now(),
            renewal: None,
        };
        let previous = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.insert(key, entry)
        };
        if let Some(handle) = previous.and_then(|prev| prev.renewal) {
            handle.abort();
        }
        generation
    }

    /// Attaches a renewal timer to the entry at the given generation.
    ///
    /// If the entry has since been replaced or evicted, the timer is aborted
    /// immediately instead.
    pub fn set_renewal(&self, key: &TenantKey, generation: u64, handle: AbortHandle) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(key) {
            Some(entry) if entry.generation == generation => {
                entry.renewal = Some(handle);
            }
            _ => {
                drop(entries);
                handle.abort();
            }
        }
    }

    /// Replaces the token of the entry at the given generation, in place.
    ///
    /// Used by renewal timers: the timer keeps running for its entry, so the
    /// generation and renewal handle are retained. Returns false when the
    /// entry has been replaced or evicted (the renewal is a no-op).
    pub fn refresh(&self, key: &TenantKey, generation: u64, token: String) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(key) {
            Some(entry) if entry.generation == generation => {
                entry.token = token;
                entry.acquired_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Evicts a tenant's token, aborting its renewal timer.
    ///
    /// Returns true if an entry was present.
    pub fn evict(&self, key: &TenantKey) -> bool {
        let removed = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.remove(key)
        };
        match removed {
            Some(entry) => {
                debug!(tenant = %key, "evicted integration user token");
                if let Some(handle) = entry.renewal {
                    handle.abort();
                }
                true
            }
            None => false,
        }
    }
}

impl Drop for TokenStore {
    fn drop(&mut self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for entry in entries.values_mut() {
            if let Some(handle) = entry.renewal.take() {
                handle.abort();
            }
        }
    }
}
