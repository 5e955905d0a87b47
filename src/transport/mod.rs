//! Transport: the wire-framing boundary the Tool Dispatcher is agnostic to.
//!
//! Only the trait and a stdio reference implementation live in this crate
//! (§6.2) — HTTP/SSE framing is an external-collaborator interface point,
//! not something this repository ships.

pub mod rpc;
pub mod stdio;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::dispatcher::ToolDispatcher;
use crate::error::Result;

/// Something that can drive a `ToolDispatcher` to completion for as long as
/// it has requests to serve. Implementations own their own framing and I/O;
/// `serve` returns once the transport's input is exhausted, `shutdown`
/// reports `true`, or the transport fails.
///
/// `shutdown` is only observed between requests, never used to interrupt a
/// dispatch already in flight — an abandoned caller must not prevent a
/// mutator that is mid-rewrite from completing (§5 cancellation-safety).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn serve(
        &self,
        dispatcher: Arc<ToolDispatcher>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<()>;
}
