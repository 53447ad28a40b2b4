//! Structural validation of decoded request candidates.
//!
//! Runs before any typed [`Request`](crate::request::Request) is built, so
//! everything downstream can rely on the shape. The checks mirror the
//! request schema published with the JSON-RPC 2.0 specification.

use serde_json::Value;

use crate::error::RpcError;

/// Check one decoded value against the request shape.
///
/// Accepted: an object whose `jsonrpc` member is exactly the string "2.0",
/// whose `method` member is a string, whose `params` member (if any) is an
/// array or an object, and whose `id` member (if any) is a string, an
/// integer, or null.
pub fn validate(candidate: &Value) -> Result<(), RpcError> {
    let Some(members) = candidate.as_object() else {
        return Err(rejection(candidate));
    };

    match members.get("jsonrpc") {
        Some(Value::String(version)) if version == "2.0" => {}
        _ => return Err(rejection(candidate)),
    }

    match members.get("method") {
        Some(Value::String(_)) => {}
        _ => return Err(rejection(candidate)),
    }

    match members.get("params") {
        None | Some(Value::Array(_)) | Some(Value::Object(_)) => {}
        Some(_) => return Err(rejection(candidate)),
    }

    match members.get("id") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(Value::Number(n)) if n.is_i64() => {}
        Some(_) => return Err(rejection(candidate)),
    }

    Ok(())
}

fn rejection(candidate: &Value) -> RpcError {
    RpcError::invalid_request(Some(Value::String(format!(
        "{} is not valid under any of the given schemas",
        candidate
    ))))
}
