//! Embedder Port: the abstract boundary between text and [`SparseVector`].
//!
//! The core never assumes a concrete embedding backend. The bundled
//! [`hashing`] implementation exists so the crate is usable end-to-end
//! without wiring an external model, mirroring the always-available,
//! never-production-grade role a builtin fallback plays elsewhere.

#[cfg(feature = "embedder-hashing")]
pub mod hashing;

use async_trait::async_trait;

use crate::error::Result;
use crate::sparse::SparseVector;

/// Whether a string is being embedded as a search query or as a document
/// being stored. Implementations that use asymmetric encoders key off this;
/// the bundled hashing shim treats both modes identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    Query,
    Document,
}

/// Converts text into a sparse numeric fingerprint.
///
/// Implementations must be deterministic for identical `(text, mode,
/// configured model)` and must uphold I2: every component of the returned
/// vector is non-zero. Implementations may hold their own internal state
/// (model weights, caches) and must be safe to call concurrently.
#[async_trait]
pub trait EmbedderPort: Send + Sync {
    async fn embed(&self, text: &str, mode: EmbedMode) -> Result<SparseVector>;
}
