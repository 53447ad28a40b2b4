//! # JSON-RPC 2.0 Request Dispatcher
//!
//! A pure, transport-agnostic JSON-RPC 2.0 request dispatcher. Give it a
//! registry of methods and an incoming payload (raw text or decoded JSON)
//! and it validates the request, invokes the matching method, and shapes a
//! spec-compliant response, or no response at all for notifications. Embed
//! it in whatever transport you run: an HTTP handler, a socket server, a
//! message-queue consumer.
//!
//! ## Features
//! - Full JSON-RPC 2.0 specification compliance, batches included
//! - Transport agnostic (works with HTTP, WebSocket, TCP, etc.)
//! - Sync and async dispatch (`async` feature, on by default)
//! - Schema validation of incoming requests, skippable for speed
//! - Per-dispatcher configuration, never global state
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use wirecall::prelude::*;
//!
//! let mut methods = Methods::new();
//! methods.insert("subtract", |params: Option<RequestParams>| {
//!     let (minuend, subtrahend): (i64, i64) = params
//!         .ok_or_else(|| RpcError::invalid_params("params are required"))?
//!         .parse()?;
//!     Ok(json!(minuend - subtrahend))
//! });
//!
//! let response = dispatch(
//!     &methods,
//!     r#"{"jsonrpc": "2.0", "method": "subtract", "params": [42, 23], "id": 1}"#,
//! );
//! assert_eq!(
//!     response.to_json_string().unwrap(),
//!     r#"{"jsonrpc":"2.0","result":19,"id":1}"#
//! );
//! ```

pub mod dispatch;
pub mod error;
pub mod methods;
pub mod request;
pub mod response;
pub mod schema;
pub mod status;
pub mod types;

#[cfg(feature = "async")]
pub mod r#async;

pub mod prelude;

// Re-export main types
pub use dispatch::{DispatchConfig, Dispatcher, dispatch, dispatch_value};
pub use error::{ErrorObject, RpcError};
pub use methods::{Method, MethodRegistry, MethodResult, Methods};
pub use request::{Request, RequestParams};
pub use response::{BatchResponse, ErrorResponse, NotificationResponse, RequestResponse, Response};
pub use types::{JsonRpcVersion, RequestId};

#[cfg(feature = "async")]
pub use r#async::{AsyncDispatcher, AsyncMethod, AsyncMethodRegistry, AsyncMethods};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Reserved range: implementation-defined codes must stay outside it
    pub const RESERVED_START: i64 = -32768;
    pub const RESERVED_END: i64 = -32000;
}
