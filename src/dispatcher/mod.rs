//! Tool Dispatcher: validates a tool call, invokes the embedder when
//! needed, calls the Entry Store, and formats a text response.

pub mod validate;

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::OnceCell;

use crate::embedder::{EmbedMode, EmbedderPort};
use crate::error::{Result, VecfsError};
use crate::store::{Entry, EntryStore};
use validate::{parse_request, ToolRequest};

/// Builds the embedder handle the first time it's needed. Stored instead of
/// an already-constructed `Arc<dyn EmbedderPort>` so that no embedder work
/// happens until a request actually requires one.
pub type EmbedderFactory = Box<dyn Fn() -> Arc<dyn EmbedderPort> + Send + Sync>;

const DEFAULT_SEARCH_LIMIT: u64 = 5;

pub struct ToolDispatcher {
    store: Arc<EntryStore>,
    embedder_factory: Option<EmbedderFactory>,
    embedder: OnceCell<Arc<dyn EmbedderPort>>,
}

impl ToolDispatcher {
    pub fn new(store: Arc<EntryStore>, embedder_factory: Option<EmbedderFactory>) -> Self {
        Self {
            store,
            embedder_factory,
            embedder: OnceCell::new(),
        }
    }

    /// Resolve the embedder, constructing it on the first call and reusing
    /// the same handle afterwards. Fails fast if none was configured.
    async fn embedder(&self) -> Result<&Arc<dyn EmbedderPort>> {
        let factory = self
            .embedder_factory
            .as_ref()
            .ok_or(VecfsError::EmbedderUnavailable)?;
        Ok(self.embedder.get_or_init(|| async { factory() }).await)
    }

    /// Validate `arguments` for `tool`, execute it, and return the textual
    /// payload the wire contract expects in its `content[0].text` slot.
    pub async fn dispatch(&self, tool: &str, arguments: Value) -> Result<String> {
        let request = parse_request(tool, &arguments)?;
        match request {
            ToolRequest::Search { query, limit } => self.search(&query, limit).await,
            ToolRequest::Memorize { id, text, metadata } => {
                self.memorize(id, text, metadata).await
            }
            ToolRequest::Feedback {
                id,
                score_adjustment,
            } => self.feedback(&id, score_adjustment).await,
            ToolRequest::Delete { id } => self.delete(&id).await,
        }
    }

    async fn search(&self, query: &str, limit: Option<u64>) -> Result<String> {
        let embedder = self.embedder().await?;
        let vector = embedder
            .embed(query, EmbedMode::Query)
            .await
            .map_err(|e| VecfsError::EmbedderFailure(e.to_string()))?;

        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT) as usize;
        let hits = self.store.search(&vector, limit).await?;

        let payload: Vec<Value> = hits
            .into_iter()
            .map(|hit| {
                json!({
                    "id": hit.entry.id,
                    "metadata": hit.entry.metadata,
                    "score": hit.entry.score,
                    "timestamp": hit.entry.timestamp,
                    "similarity": hit.similarity,
                })
            })
            .collect();

        serde_json::to_string(&payload).map_err(|e| VecfsError::StorageFailure(e.to_string()))
    }

    async fn memorize(
        &self,
        id: String,
        text: String,
        metadata: Option<serde_json::Map<String, Value>>,
    ) -> Result<String> {
        let embedder = self.embedder().await?;
        let vector = embedder
            .embed(&text, EmbedMode::Document)
            .await
            .map_err(|e| VecfsError::EmbedderFailure(e.to_string()))?;

        let mut metadata = metadata.unwrap_or_default();
        metadata.insert("text".to_string(), Value::String(text));

        let entry = Entry {
            id: id.clone(),
            vector,
            metadata,
            score: 0.0,
            timestamp: 0,
            extra: Default::default(),
        };
        self.store.store(entry).await?;
        Ok(format!("Stored entry: {id}"))
    }

    async fn feedback(&self, id: &str, score_adjustment: f64) -> Result<String> {
        let found = self.store.update_score(id, score_adjustment).await?;
        Ok(if found {
            format!("Updated score for entry: {id}")
        } else {
            format!("Entry not found: {id}")
        })
    }

    async fn delete(&self, id: &str) -> Result<String> {
        let found = self.store.delete(id).await?;
        Ok(if found {
            format!("Deleted entry: {id}")
        } else {
            format!("Entry not found: {id}")
        })
    }
}
