use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::key::CacheKey;

/// Responses older than this are refetched.
pub const DEFAULT_FRESHNESS: std::time::Duration = std::time::Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub body: Value,
    pub cached_at: DateTime<Utc>,
}

impl CachedResponse {
    pub fn new(body: Value, cached_at: DateTime<Utc>) -> Self {
        Self { body, cached_at }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.cached_at
    }

    /// Fresh while strictly younger than the window
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age(now) < window
    }

    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        let age = self.age(now);
        let seconds = age.num_seconds();
        if seconds < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if seconds < 60 {
            format!("{}s ago", seconds)
        } else if seconds < 3600 {
            format!("{}m ago", age.num_minutes())
        } else {
            format!("{}h ago", age.num_hours())
        }
    }
}

/// Read-through cache for GET response bodies.
///
/// All access goes through one mutex; it is never held across an await.
/// `generation` only changes while that mutex is held, so a response fetched
/// before a `clear` can never be stored after it.
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, CachedResponse>>,
    generation: AtomicU64,
    freshness: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(freshness: std::time::Duration) -> Self {
        Self::with_clock(freshness, Arc::new(SystemClock))
    }

    pub fn with_clock(freshness: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            freshness: Duration::from_std(freshness).unwrap_or_else(|_| Duration::days(36_500)),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CachedResponse>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Body for `key` if an entry exists and is still fresh.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let now = self.clock.now();
        let entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now, self.freshness) => Some(entry.body.clone()),
            Some(_) => {
                debug!(key = %key, "Cached response is stale");
                None
            }
            None => None,
        }
    }

    /// Entry for `key` regardless of freshness
    pub fn entry(&self, key: &CacheKey) -> Option<CachedResponse> {
        self.lock().get(key).cloned()
    }

    /// Store `body` under `key` stamped with the current time, replacing any prior entry.
    pub fn insert(&self, key: CacheKey, body: Value) {
        let now = self.clock.now();
        self.lock().insert(key, CachedResponse::new(body, now));
    }

    /// Bumped by every `clear`. Record it before fetching and hand it to
    /// `insert_if_current`.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store `body` unless the cache was cleared since `generation` was read.
    /// Returns whether the entry was stored.
    pub fn insert_if_current(&self, key: CacheKey, body: Value, generation: u64) -> bool {
        let now = self.clock.now();
        let mut entries = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(key = %key, "Cache cleared while request was in flight, not storing");
            return false;
        }
        entries.insert(key, CachedResponse::new(body, now));
        true
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if !entries.is_empty() {
            debug!(entries = entries.len(), "Clearing response cache");
        }
        entries.clear();
    }

    /// Drop every stale entry. Returns how many were removed.
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.freshness));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Removed expired cache entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of every entry, sorted by key
    pub fn snapshot(&self) -> Vec<(CacheKey, CachedResponse)> {
        let mut items: Vec<_> = self
            .lock()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        items
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.len())
            .field("freshness", &self.freshness)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
