use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::status;

/// Everything that can go wrong while processing a request.
///
/// The five reserved kinds carry the code and message fixed by the JSON-RPC
/// 2.0 specification; `Application` carries an implementation-defined code,
/// which must stay outside the reserved range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RpcError {
    #[error("Parse error")]
    ParseError,
    #[error("Invalid Request")]
    InvalidRequest { data: Option<Value> },
    #[error("Method not found: {method}")]
    MethodNotFound { method: String },
    #[error("Invalid params")]
    InvalidParams { data: Option<Value> },
    #[error("Internal error")]
    InternalError { data: Option<Value> },
    #[error("{message}")]
    Application {
        code: i64,
        message: String,
        data: Option<Value>,
    },
}

impl RpcError {
    pub fn parse_error() -> Self {
        RpcError::ParseError
    }

    pub fn invalid_request(data: Option<Value>) -> Self {
        RpcError::InvalidRequest { data }
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        RpcError::MethodNotFound {
            method: method.into(),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        RpcError::InvalidParams {
            data: Some(Value::String(message.into())),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        RpcError::InternalError {
            data: Some(Value::String(message.into())),
        }
    }

    /// An implementation-defined error. Panics if `code` falls inside the
    /// range the specification reserves for protocol errors.
    pub fn application(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        assert!(
            !(-32768..=-32000).contains(&code),
            "application error codes must stay outside the reserved range -32768..=-32000"
        );
        RpcError::Application {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            RpcError::ParseError => -32700,
            RpcError::InvalidRequest { .. } => -32600,
            RpcError::MethodNotFound { .. } => -32601,
            RpcError::InvalidParams { .. } => -32602,
            RpcError::InternalError { .. } => -32603,
            RpcError::Application { code, .. } => *code,
        }
    }

    /// The `message` member that goes on the wire. Fixed per code; the
    /// variable detail travels in `data` instead.
    pub fn message(&self) -> &str {
        match self {
            RpcError::ParseError => "Parse error",
            RpcError::InvalidRequest { .. } => "Invalid Request",
            RpcError::MethodNotFound { .. } => "Method not found",
            RpcError::InvalidParams { .. } => "Invalid params",
            RpcError::InternalError { .. } => "Internal error",
            RpcError::Application { message, .. } => message,
        }
    }

    /// Recommended HTTP status for transports that speak it.
    pub fn http_status(&self) -> u16 {
        status::for_error_code(self.code())
    }

    /// Build the wire error object. `data` is attached only when `debug` is
    /// set so internals never leak into production responses.
    pub fn error_object(&self, debug: bool) -> ErrorObject {
        ErrorObject {
            code: self.code(),
            message: self.message().to_string(),
            data: if debug { self.data_value() } else { None },
        }
    }

    fn data_value(&self) -> Option<Value> {
        match self {
            RpcError::ParseError => None,
            RpcError::MethodNotFound { method } => Some(Value::String(method.clone())),
            RpcError::InvalidRequest { data }
            | RpcError::InvalidParams { data }
            | RpcError::InternalError { data }
            | RpcError::Application { data, .. } => data.clone(),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for RpcError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        RpcError::internal_error(err.to_string())
    }
}

/// The `error` member of an error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
