use serde_json::json;
use tracing::{debug, warn};

use crate::error::{PortalError, PortalResult};

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn fail(id: &str, e: &PortalError) -> serde_json::Value {
    match e {
        PortalError::Storage(inner) => warn!(error = ?inner, "storage failure"),
        other => debug!(code = other.code(), message = %other, "request rejected"),
    }
    err(id, e.code(), e.to_string(), e.details())
}

/// Wraps a handler outcome in the response envelope.
pub fn respond(id: &str, result: PortalResult<serde_json::Value>) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => fail(id, &e),
    }
}
