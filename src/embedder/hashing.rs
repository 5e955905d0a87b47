//! Bundled deterministic embedder: the hashing trick.
//!
//! Tokenizes text, hashes each token into a fixed-width dense accumulator
//! with FNV-1a (stable across processes and Rust versions, unlike
//! `DefaultHasher`), L2-normalises, then thresholds — the canonical recipe
//! of the Embedder Port contract. No model, no network, no state beyond the
//! configured dimension and threshold; good enough to exercise the whole
//! crate, never the production choice.

use async_trait::async_trait;

use crate::embedder::{EmbedMode, EmbedderPort};
use crate::error::Result;
use crate::sparse::{dense_to_sparse, SparseVector};

/// Width of the dense accumulator tokens hash into. Large enough that
/// collisions between unrelated words are rare for the short texts this
/// crate expects to memorize.
const DIMENSIONS: usize = 512;

pub struct HashingEmbedder {
    threshold: f64,
}

impl HashingEmbedder {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

#[async_trait]
impl EmbedderPort for HashingEmbedder {
    async fn embed(&self, text: &str, _mode: EmbedMode) -> Result<SparseVector> {
        let mut dense = vec![0.0f64; DIMENSIONS];
        for token in tokenize(text) {
            let slot = (fnv1a(&token) as usize) % DIMENSIONS;
            dense[slot] += 1.0;
        }
        Ok(dense_to_sparse(&dense, self.threshold, true))
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

fn fnv1a(token: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for byte in token.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
