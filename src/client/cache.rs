use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::Document;
use crate::query::QueryParams;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct CacheEntry {
    issued: u64,
    stored_at: Instant,
    documents: Vec<Document>,
}

/// Decoded query results keyed by expression and parameters.
///
/// Writes are ordered by when the request was issued, not when it completed:
/// a slow response never replaces the result of a request issued after it.
pub struct QueryCache {
    ttl: Duration,
    next_issue: AtomicU64,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_issue: AtomicU64::new(0),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Deterministic key from the expression and canonical params.
    pub fn key(expression: &str, params: &QueryParams) -> String {
        let mut hasher = Sha256::new();
        hasher.update(expression.as_bytes());
        hasher.update([0u8]);
        hasher.update(params.canonical_json().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Sequence number for a request about to go to the store.
    pub fn issue(&self) -> u64 {
        self.next_issue.fetch_add(1, Ordering::Relaxed)
    }

    pub fn get(&self, key: &str) -> Option<Vec<Document>> {
        if self.ttl.is_zero() {
            return None;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.documents.clone()),
            Some(_) => {
                debug!("Cache entry {} expired", key.get(..8).unwrap_or(key));
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores the result of request `issued`, unless a later request for the
    /// same key already stored its own. Expired entries are pruned.
    pub fn put(&self, key: String, issued: u64, documents: Vec<Document>) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);

        if let Some(existing) = entries.get(&key) {
            if existing.issued > issued {
                debug!(
                    "Cache keeping {} from request #{} over #{}",
                    key.get(..8).unwrap_or(&key),
                    existing.issued,
                    issued
                );
                return;
            }
        }

        entries.insert(
            key,
            CacheEntry {
                issued,
                stored_at: Instant::now(),
                documents,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
