use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{ErrorObject, RpcError};
use crate::status;
use crate::types::{JsonRpcVersion, RequestId};

/// Successful reply to an id-bearing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub result: Value,
    pub id: RequestId,
}

impl RequestResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            result,
            id,
        }
    }
}

/// Reply to a failed request.
///
/// `id` is `None` when the failure happened before an id could be
/// determined (parse error, schema rejection); it then serializes as
/// JSON `null`, never omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub error: ErrorObject,
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl ErrorResponse {
    pub fn new(error: &RpcError, id: Option<RequestId>, debug: bool) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            error: error.error_object(debug),
            id,
        }
    }

    pub fn http_status(&self) -> u16 {
        status::for_error_code(self.error.code)
    }
}

/// The absence of a reply. Produced for notifications; serializes to
/// nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotificationResponse;

/// Ordered replies to a batch. After dispatch this never contains
/// notification entries; rendering skips any that are present anyway.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchResponse(pub Vec<Response>);

impl BatchResponse {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, response: Response) {
        self.0.push(response);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Response> {
        self.0.iter()
    }

    /// Drop the entries that carry no payload.
    pub fn without_notifications(self) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|r| !r.is_notification())
                .collect(),
        )
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.0.iter().filter_map(|r| r.to_value()).collect())
    }

    pub fn to_json_string(&self) -> String {
        let parts: Vec<String> = self.0.iter().filter_map(|r| r.to_json_string()).collect();
        format!("[{}]", parts.join(","))
    }
}

impl FromIterator<Response> for BatchResponse {
    fn from_iter<I: IntoIterator<Item = Response>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for BatchResponse {
    type Item = Response;
    type IntoIter = std::vec::IntoIter<Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The outcome of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Request(RequestResponse),
    Error(ErrorResponse),
    Notification(NotificationResponse),
    Batch(BatchResponse),
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Response::Request(RequestResponse::new(id, result))
    }

    pub fn error(error: &RpcError, id: Option<RequestId>, debug: bool) -> Self {
        Response::Error(ErrorResponse::new(error, id, debug))
    }

    pub fn notification() -> Self {
        Response::Notification(NotificationResponse)
    }

    /// True when no payload should be written back to the caller.
    pub fn is_notification(&self) -> bool {
        matches!(self, Response::Notification(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    /// The id this response answers, when it answers a single request.
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            Response::Request(r) => Some(&r.id),
            Response::Error(e) => e.id.as_ref(),
            Response::Notification(_) | Response::Batch(_) => None,
        }
    }

    /// Structured form of the payload, `None` for notifications.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Response::Request(r) => serde_json::to_value(r).ok(),
            Response::Error(e) => serde_json::to_value(e).ok(),
            Response::Notification(_) => None,
            Response::Batch(b) => Some(b.to_value()),
        }
    }

    /// Wire text of the payload, `None` for notifications. Members appear
    /// in specification order (`jsonrpc`, then `result`/`error`, then `id`).
    pub fn to_json_string(&self) -> Option<String> {
        match self {
            Response::Request(r) => serde_json::to_string(r).ok(),
            Response::Error(e) => serde_json::to_string(e).ok(),
            Response::Notification(_) => None,
            Response::Batch(b) => Some(b.to_json_string()),
        }
    }

    /// Recommended HTTP status. Batches are always 200 since their items
    /// can mix success and failure.
    pub fn http_status(&self) -> u16 {
        match self {
            Response::Request(_) => status::HTTP_OK,
            Response::Error(e) => e.http_status(),
            Response::Notification(_) => status::HTTP_NO_CONTENT,
            Response::Batch(_) => status::HTTP_OK,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string().unwrap_or_default())
    }
}

impl From<RequestResponse> for Response {
    fn from(response: RequestResponse) -> Self {
        Response::Request(response)
    }
}

impl From<ErrorResponse> for Response {
    fn from(response: ErrorResponse) -> Self {
        Response::Error(response)
    }
}

impl From<NotificationResponse> for Response {
    fn from(response: NotificationResponse) -> Self {
        Response::Notification(response)
    }
}

impl From<BatchResponse> for Response {
    fn from(response: BatchResponse) -> Self {
        Response::Batch(response)
    }
}
