//! Schema-free argument parsing: JSON `arguments` in, a typed [`ToolRequest`]
//! out, or a descriptive [`VecfsError::InvalidArgument`] naming the tool.
//!
//! Replaces the dynamically-typed runtime schema validation pattern with
//! parsing into a tagged sum type — the failure mode collapses to "this
//! didn't parse" rather than a family of schema-violation shapes.

use serde_json::{Map, Value};

use crate::error::{Result, VecfsError};

#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    Search {
        query: String,
        limit: Option<u64>,
    },
    Memorize {
        id: String,
        text: String,
        metadata: Option<Map<String, Value>>,
    },
    Feedback {
        id: String,
        score_adjustment: f64,
    },
    Delete {
        id: String,
    },
}

pub fn parse_request(tool: &str, arguments: &Value) -> Result<ToolRequest> {
    let obj = arguments
        .as_object()
        .ok_or_else(|| VecfsError::invalid_argument(tool, "arguments must be a JSON object"))?;

    match tool {
        "search" => Ok(ToolRequest::Search {
            query: require_string(tool, obj, "query")?,
            limit: optional_u64(tool, obj, "limit")?,
        }),
        "memorize" => Ok(ToolRequest::Memorize {
            id: require_string(tool, obj, "id")?,
            text: require_string(tool, obj, "text")?,
            metadata: optional_object(tool, obj, "metadata")?,
        }),
        "feedback" => Ok(ToolRequest::Feedback {
            id: require_string(tool, obj, "id")?,
            score_adjustment: require_finite_number(tool, obj, "scoreAdjustment")?,
        }),
        "delete" => Ok(ToolRequest::Delete {
            id: require_string(tool, obj, "id")?,
        }),
        other => Err(VecfsError::invalid_argument(
            other,
            "unknown tool".to_string(),
        )),
    }
}

fn require_string(tool: &str, obj: &Map<String, Value>, field: &str) -> Result<String> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| VecfsError::invalid_argument(tool, format!("missing or non-string '{field}'")))
}

fn optional_object(
    tool: &str,
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Option<Map<String, Value>>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(m)) => Ok(Some(m.clone())),
        Some(_) => Err(VecfsError::invalid_argument(
            tool,
            format!("'{field}' must be an object"),
        )),
    }
}

fn optional_u64(tool: &str, obj: &Map<String, Value>, field: &str) -> Result<Option<u64>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => {
            let n = v
                .as_u64()
                .ok_or_else(|| VecfsError::invalid_argument(tool, format!("'{field}' must be an integer ≥ 0")))?;
            Ok(Some(n))
        }
    }
}

/// Parses a required numeric field, rejecting non-finite values (NaN/∞) at
/// this boundary — the conservative resolution §9 calls for.
fn require_finite_number(tool: &str, obj: &Map<String, Value>, field: &str) -> Result<f64> {
    let n = obj
        .get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| VecfsError::invalid_argument(tool, format!("missing or non-numeric '{field}'")))?;
    if !n.is_finite() {
        return Err(VecfsError::invalid_argument(
            tool,
            format!("'{field}' must be a finite number"),
        ));
    }
    Ok(n)
}
