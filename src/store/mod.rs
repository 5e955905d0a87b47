//! The Entry Store: owns the on-disk log, maintains a coherent in-memory
//! cache, and serves create/upsert/delete and ranked retrieval.

pub mod lock;
pub mod log;

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::error::Result;
use crate::sparse::{self, SparseVector, FEEDBACK_WEIGHT};
use lock::SerialisationMutex;

/// The persisted unit. `extra` preserves any top-level key neither this
/// struct nor a future version of it knows about, round-tripping through a
/// rewrite untouched (§6.1 forward-compatibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(default)]
    pub vector: SparseVector,
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
    #[serde(default)]
    pub score: f64,
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// An `Entry` augmented with the similarity and blended rank used to order a
/// single search call's results. `rank_score` has no meaning outside that
/// call — it is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub entry: Entry,
    pub similarity: f64,
    pub rank_score: f64,
}

pub struct EntryStore {
    path: PathBuf,
    lock: SerialisationMutex,
    cache: ArcSwap<Vec<Entry>>,
    loaded: OnceCell<()>,
}

impl EntryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: SerialisationMutex::new(),
            cache: ArcSwap::from_pointee(Vec::new()),
            loaded: OnceCell::new(),
        }
    }

    /// Populate the cache from disk exactly once. Safe to call from any
    /// number of concurrent operations; only the first caller actually reads
    /// the file, the rest wait on the same initialisation.
    async fn ensure_loaded(&self) -> Result<()> {
        self.loaded
            .get_or_try_init(|| async {
                let entries = log::read_log(&self.path).await?;
                self.cache.store(Arc::new(entries));
                Ok(())
            })
            .await?;
        Ok(())
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Insert-or-replace keyed by `id`. `entry.timestamp` is ignored and
    /// overwritten with "now"; callers supply every other field, including
    /// `score` (the standard memorize path always supplies 0, resetting
    /// reinforcement on re-assertion — §4.3.1).
    ///
    /// Returns `true` if this created a new entry, `false` if it replaced an
    /// existing one in place.
    pub async fn store(&self, mut entry: Entry) -> Result<bool> {
        let _guard = self.lock.acquire().await;
        self.ensure_loaded().await?;

        entry.timestamp = Self::now_ms();
        let current = self.cache.load();

        if let Some(idx) = current.iter().position(|e| e.id == entry.id) {
            let mut next: Vec<Entry> = (**current).clone();
            next[idx] = entry;
            log::rewrite_log(&self.path, &next).await?;
            self.cache.store(Arc::new(next));
            Ok(false)
        } else {
            log::append_entry(&self.path, &entry).await?;
            let mut next: Vec<Entry> = (**current).clone();
            next.push(entry);
            self.cache.store(Arc::new(next));
            Ok(true)
        }
    }

    /// Rank every cached entry against `query` and return the top `limit`.
    /// Never acquires the serialisation mutex — reads a single atomically
    /// published snapshot of the cache (§5).
    pub async fn search(&self, query: &SparseVector, limit: usize) -> Result<Vec<SearchHit>> {
        self.ensure_loaded().await?;

        if limit == 0 {
            return Ok(Vec::new());
        }

        let snapshot = self.cache.load();
        let qn = sparse::norm(query);

        let mut hits: Vec<SearchHit> = snapshot
            .iter()
            .map(|entry| {
                let similarity = sparse::cosine(query, &entry.vector, Some(qn));
                let boost = entry.score / (1.0 + entry.score.abs());
                let rank_score = similarity + FEEDBACK_WEIGHT * boost;
                SearchHit {
                    entry: entry.clone(),
                    similarity,
                    rank_score,
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.rank_score
                .partial_cmp(&a.rank_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.entry.timestamp.cmp(&a.entry.timestamp))
                .then_with(|| a.entry.id.cmp(&b.entry.id))
        });

        hits.truncate(limit);
        Ok(hits)
    }

    /// Add `adjustment` to the entry's score. Returns whether `id` was
    /// found; a missing id is a normal outcome, not an error (§4.3.3).
    pub async fn update_score(&self, id: &str, adjustment: f64) -> Result<bool> {
        let _guard = self.lock.acquire().await;
        self.ensure_loaded().await?;

        let current = self.cache.load();
        let Some(idx) = current.iter().position(|e| e.id == id) else {
            return Ok(false);
        };

        let mut next: Vec<Entry> = (**current).clone();
        next[idx].score += adjustment;
        log::rewrite_log(&self.path, &next).await?;
        self.cache.store(Arc::new(next));
        Ok(true)
    }

    /// Remove the entry with `id`. Returns whether it was found.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.acquire().await;
        self.ensure_loaded().await?;

        let current = self.cache.load();
        let Some(idx) = current.iter().position(|e| e.id == id) else {
            return Ok(false);
        };

        let mut next: Vec<Entry> = (**current).clone();
        next.remove(idx);
        log::rewrite_log(&self.path, &next).await?;
        self.cache.store(Arc::new(next));
        Ok(true)
    }
}
