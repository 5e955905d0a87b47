//! VecFS: a local-first long-term memory store for AI agents.
//!
//! Sparse-vector semantic recall over a JSONL log, ranked by cosine
//! similarity blended with a bounded reinforcement-feedback signal, exposed
//! through a small validated tool contract (search, memorize, feedback,
//! delete).

pub mod config;
pub mod dispatcher;
pub mod embedder;
pub mod error;
pub mod sparse;
pub mod store;
pub mod transport;

pub use error::{Result, VecfsError};
