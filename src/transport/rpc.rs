//! JSON-RPC 2.0 envelope types shared by every transport.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::VecfsError;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success_text(id: Value, text: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(json!({ "content": [{ "type": "text", "text": text }] })),
            error: None,
        }
    }

    pub fn from_error(id: Value, err: VecfsError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError::from(err)),
        }
    }

    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code: -32601,
                message: format!("method not found: {method}"),
            }),
        }
    }

    pub fn parse_error() -> Self {
        Self {
            jsonrpc: "2.0",
            id: Value::Null,
            result: None,
            error: Some(JsonRpcError {
                code: -32700,
                message: "parse error".to_string(),
            }),
        }
    }
}

impl From<VecfsError> for JsonRpcError {
    fn from(err: VecfsError) -> Self {
        let code = match &err {
            VecfsError::InvalidArgument { .. } => -32602,
            VecfsError::EmbedderUnavailable
            | VecfsError::EmbedderFailure(_)
            | VecfsError::StorageFailure(_)
            | VecfsError::Config(_)
            | VecfsError::Io(_) => -32000,
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}
