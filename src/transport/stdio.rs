//! Stdio transport: Content-Length-framed JSON-RPC over stdin/stdout.
//!
//! The reference implementation the wire contract is specified against.
//! Framing mirrors the client-side `StdioTransport` pattern used elsewhere
//! for talking *to* a subprocess server; here VecFS plays the server role,
//! reading request frames from stdin and writing response frames to stdout.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::{watch, Mutex};

use super::rpc::{JsonRpcRequest, JsonRpcResponse, ToolCallParams};
use super::Transport;
use crate::dispatcher::ToolDispatcher;
use crate::error::Result;

pub struct StdioTransport {
    reader: Mutex<BufReader<Stdin>>,
    writer: Mutex<Stdout>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            reader: Mutex::new(BufReader::new(tokio::io::stdin())),
            writer: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for StdioTransport {
    /// Read and answer request frames until stdin closes or `shutdown`
    /// reports `true`. A request that fails to parse gets a JSON-RPC
    /// parse-error response rather than aborting the loop — one bad frame
    /// must not take down the server.
    ///
    /// The shutdown signal is only awaited while idle, between frames —
    /// once a frame is read, its dispatch always runs to completion.
    async fn serve(
        &self,
        dispatcher: Arc<ToolDispatcher>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        loop {
            let frame = {
                let mut reader = self.reader.lock().await;
                tokio::select! {
                    frame = read_frame(&mut *reader) => frame?,
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            break;
                        }
                        continue;
                    }
                }
            };
            let Some(body) = frame else {
                break;
            };

            let response = match serde_json::from_slice::<JsonRpcRequest>(&body) {
                Ok(request) => handle_request(&dispatcher, request).await,
                Err(_) => JsonRpcResponse::parse_error(),
            };

            write_frame(&self.writer, &response).await?;
        }
        Ok(())
    }
}

async fn handle_request(
    dispatcher: &ToolDispatcher,
    request: JsonRpcRequest,
) -> JsonRpcResponse {
    if request.method != "tools/call" {
        return JsonRpcResponse::method_not_found(request.id, &request.method);
    }

    let params: ToolCallParams = match serde_json::from_value(request.params) {
        Ok(p) => p,
        Err(_) => {
            return JsonRpcResponse::method_not_found(request.id, "tools/call");
        }
    };

    match dispatcher.dispatch(&params.name, params.arguments).await {
        Ok(text) => JsonRpcResponse::success_text(request.id, text),
        Err(e) => JsonRpcResponse::from_error(request.id, e),
    }
}

/// Read one Content-Length-framed message body. Returns `None` on a clean
/// EOF encountered before any header bytes arrive (stdin closed between
/// requests); any other I/O problem propagates as a `StorageFailure`.
async fn read_frame<R: tokio::io::AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<Option<Vec<u8>>> {
    let mut content_length: Option<usize> = None;
    loop {
        let mut header_line = String::new();
        let n = reader
            .read_line(&mut header_line)
            .await
            .map_err(crate::error::VecfsError::Io)?;
        if n == 0 {
            return Ok(None);
        }
        let trimmed = header_line.trim();
        if trimmed.is_empty() {
            break;
        }
        if let Some(value) = trimmed.strip_prefix("Content-Length:") {
            content_length = value.trim().parse::<usize>().ok();
        }
    }

    let Some(len) = content_length else {
        return Err(crate::error::VecfsError::StorageFailure(
            "request frame missing Content-Length header".to_string(),
        ));
    };

    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(crate::error::VecfsError::Io)?;
    Ok(Some(buf))
}

async fn write_frame(writer: &Mutex<Stdout>, response: &JsonRpcResponse) -> Result<()> {
    let body = serde_json::to_vec(response)
        .map_err(|e| crate::error::VecfsError::StorageFailure(e.to_string()))?;
    let mut out = writer.lock().await;
    out.write_all(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes())
        .await
        .map_err(crate::error::VecfsError::Io)?;
    out.write_all(&body).await.map_err(crate::error::VecfsError::Io)?;
    out.flush().await.map_err(crate::error::VecfsError::Io)?;
    Ok(())
}
