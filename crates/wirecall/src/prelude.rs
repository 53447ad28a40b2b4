//! # Dispatcher Prelude
//!
//! Convenient re-exports of the most commonly used types.
//!
//! ```rust
//! use wirecall::prelude::*;
//! ```

pub use crate::dispatch::{DispatchConfig, Dispatcher, dispatch, dispatch_value};
pub use crate::error::{ErrorObject, RpcError};
pub use crate::methods::{Method, MethodRegistry, MethodResult, Methods};
pub use crate::request::{Request, RequestParams};
pub use crate::response::{
    BatchResponse, ErrorResponse, NotificationResponse, RequestResponse, Response,
};
pub use crate::types::{JsonRpcVersion, RequestId};

#[cfg(feature = "async")]
pub use crate::r#async::{AsyncDispatcher, AsyncMethod, AsyncMethodRegistry, AsyncMethods};

// Standard error codes
pub use crate::error_codes::*;
