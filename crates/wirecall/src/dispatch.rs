use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::error::RpcError;
use crate::methods::MethodRegistry;
use crate::request::Request;
use crate::response::{BatchResponse, Response};
use crate::status;

/// Per-dispatcher knobs.
///
/// An explicit value held by the dispatcher, so concurrent dispatchers
/// with different settings never interfere.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Check candidates against the request schema before construction.
    pub validate: bool,
    /// Attach diagnostic `data` to wire error objects.
    pub debug: bool,
    /// Convert camelCase method names and named-param keys to snake_case.
    pub convert_camel_case: bool,
    /// Emit incoming payloads under the `wirecall::request` target.
    pub log_requests: bool,
    /// Emit outgoing payloads under the `wirecall::response` target.
    pub log_responses: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            validate: true,
            debug: false,
            convert_camel_case: false,
            log_requests: true,
            log_responses: true,
        }
    }
}

impl DispatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn convert_camel_case(mut self, convert: bool) -> Self {
        self.convert_camel_case = convert;
        self
    }

    pub fn log_requests(mut self, log: bool) -> Self {
        self.log_requests = log;
        self
    }

    pub fn log_responses(mut self, log: bool) -> Self {
        self.log_responses = log;
        self
    }
}

/// Drives requests through decode, validate, resolve, invoke, and wrap.
///
/// Holds nothing but configuration; the method registry is borrowed per
/// call, so one dispatcher can serve any number of registries and calls.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Process a raw text payload. Undecodable input yields a parse-error
    /// response with a null id.
    pub fn dispatch_str<R>(&self, registry: &R, request: &str) -> Response
    where
        R: MethodRegistry + ?Sized,
    {
        log_request_payload(&self.config, &request);
        let response = match serde_json::from_str::<Value>(request) {
            Ok(decoded) => self.dispatch_decoded(registry, decoded),
            Err(_) => Response::error(&RpcError::parse_error(), None, self.config.debug),
        };
        log_response_payload(&self.config, &response);
        response
    }

    /// Process an already-decoded value.
    pub fn dispatch_value<R>(&self, registry: &R, request: Value) -> Response
    where
        R: MethodRegistry + ?Sized,
    {
        log_request_payload(&self.config, &request);
        let response = self.dispatch_decoded(registry, request);
        log_response_payload(&self.config, &response);
        response
    }

    fn dispatch_decoded<R>(&self, registry: &R, request: Value) -> Response
    where
        R: MethodRegistry + ?Sized,
    {
        match request {
            Value::Array(items) => self.dispatch_batch(registry, items),
            single => self.dispatch_single(registry, single),
        }
    }

    fn dispatch_single<R>(&self, registry: &R, request: Value) -> Response
    where
        R: MethodRegistry + ?Sized,
    {
        match Request::from_value(request, &self.config) {
            Ok(request) => request.process(registry, &self.config),
            Err(error) => Response::error(&error, None, self.config.debug),
        }
    }

    /// Batch handling. Items are processed independently in input order;
    /// one bad item never aborts its siblings.
    fn dispatch_batch<R>(&self, registry: &R, items: Vec<Value>) -> Response
    where
        R: MethodRegistry + ?Sized,
    {
        // An empty array is itself an invalid request, answered singly.
        if items.is_empty() {
            return Response::error(&RpcError::invalid_request(None), None, self.config.debug);
        }
        let batch: BatchResponse = items
            .into_iter()
            .map(|item| self.dispatch_single(registry, item))
            .collect();
        // Nothing is returned for an all-notification batch.
        let batch = batch.without_notifications();
        if batch.is_empty() {
            Response::notification()
        } else {
            Response::Batch(batch)
        }
    }
}

pub(crate) fn log_request_payload(config: &DispatchConfig, payload: &dyn fmt::Display) {
    if config.log_requests {
        debug!(target: "wirecall::request", "{}", payload);
    }
}

pub(crate) fn log_response_payload(config: &DispatchConfig, response: &Response) {
    if config.log_responses {
        let http_status = response.http_status();
        debug!(
            target: "wirecall::response",
            http_status,
            http_reason = status::reason_phrase(http_status),
            "{}", response
        );
    }
}

/// Dispatch a text payload with the default configuration.
pub fn dispatch<R>(registry: &R, request: &str) -> Response
where
    R: MethodRegistry + ?Sized,
{
    Dispatcher::new().dispatch_str(registry, request)
}

/// Dispatch a decoded value with the default configuration.
pub fn dispatch_value<R>(registry: &R, request: Value) -> Response
where
    R: MethodRegistry + ?Sized,
{
    Dispatcher::new().dispatch_value(registry, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::{MethodResult, Methods};
    use crate::request::RequestParams;
    use serde_json::json;

    fn registry() -> Methods {
        let mut methods = Methods::new();
        methods.insert("ping", |_: Option<RequestParams>| Ok(json!("pong")));
        methods.insert("sum", |params: Option<RequestParams>| {
            let terms: Vec<i64> = match params {
                Some(p) => p.parse()?,
                None => vec![],
            };
            Ok(json!(terms.iter().sum::<i64>()))
        });
        methods.insert("fail", |_: Option<RequestParams>| -> MethodResult {
            Err(RpcError::internal_error("boom"))
        });
        methods
    }

    #[test]
    fn test_dispatch_str_success() {
        let response = dispatch(
            &registry(),
            r#"{"jsonrpc": "2.0", "method": "ping", "id": 1}"#,
        );
        assert_eq!(
            response.to_json_string().unwrap(),
            r#"{"jsonrpc":"2.0","result":"pong","id":1}"#
        );
    }

    #[test]
    fn test_dispatch_str_parse_error() {
        let response = dispatch(&registry(), r#"{"jsonrpc"#);
        assert_eq!(
            response.to_json_string().unwrap(),
            r#"{"jsonrpc":"2.0","error":{"code":-32700,"message":"Parse error"},"id":null}"#
        );
        assert_eq!(response.http_status(), 400);
    }

    #[test]
    fn test_single_quotes_are_a_parse_error() {
        let response = dispatch(&registry(), "{'jsonrpc': '2.0', 'method': 'ping'}");
        assert!(response.is_error());
        assert_eq!(response.to_value().unwrap()["error"]["code"], json!(-32700));
    }

    #[test]
    fn test_empty_batch_is_single_invalid_request() {
        let response = dispatch(&registry(), "[]");
        assert_eq!(
            response.to_json_string().unwrap(),
            r#"{"jsonrpc":"2.0","error":{"code":-32600,"message":"Invalid Request"},"id":null}"#
        );
    }

    #[test]
    fn test_batch_preserves_order() {
        let response = dispatch_value(
            &registry(),
            json!([
                {"jsonrpc": "2.0", "method": "sum", "params": [1, 2, 4], "id": "1"},
                {"jsonrpc": "2.0", "method": "ping", "id": "2"},
                {"jsonrpc": "2.0", "method": "sum", "params": [10, 10], "id": "3"}
            ]),
        );
        assert_eq!(
            response.to_value().unwrap(),
            json!([
                {"jsonrpc": "2.0", "result": 7, "id": "1"},
                {"jsonrpc": "2.0", "result": "pong", "id": "2"},
                {"jsonrpc": "2.0", "result": 20, "id": "3"}
            ])
        );
        assert_eq!(response.http_status(), 200);
    }

    #[test]
    fn test_all_notification_batch_yields_nothing() {
        let response = dispatch_value(
            &registry(),
            json!([
                {"jsonrpc": "2.0", "method": "ping"},
                {"jsonrpc": "2.0", "method": "fail"}
            ]),
        );
        assert!(response.is_notification());
        assert!(response.to_json_string().is_none());
    }

    #[test]
    fn test_single_notification_yields_nothing() {
        let response = dispatch(&registry(), r#"{"jsonrpc": "2.0", "method": "ping"}"#);
        assert!(response.is_notification());
        assert_eq!(response.http_status(), 204);
    }

    #[test]
    fn test_batch_isolates_bad_items() {
        let dispatcher = Dispatcher::with_config(DispatchConfig::default().debug(true));
        let response = dispatcher.dispatch_value(
            &registry(),
            json!([
                1,
                {"jsonrpc": "2.0", "method": "ping", "id": 1}
            ]),
        );
        let value = response.to_value().unwrap();
        assert_eq!(value[0]["error"]["code"], json!(-32600));
        assert_eq!(
            value[0]["error"]["data"],
            json!("1 is not valid under any of the given schemas")
        );
        assert_eq!(value[0]["id"], json!(null));
        assert_eq!(value[1]["result"], json!("pong"));
    }

    #[test]
    fn test_validation_off_accepts_loose_shapes() {
        let dispatcher = Dispatcher::with_config(DispatchConfig::default().validate(false));
        let response = dispatcher.dispatch_value(
            &registry(),
            json!({"jsonrpc": "1.0", "method": "ping", "id": 1}),
        );
        assert_eq!(response.to_value().unwrap()["result"], json!("pong"));

        // Shape trouble surfaces at lookup time instead.
        let response = dispatcher.dispatch_value(&registry(), json!({"id": 2}));
        assert_eq!(response.to_value().unwrap()["error"]["code"], json!(-32601));
    }

    #[test]
    fn test_camel_case_dispatch() {
        let mut methods = Methods::new();
        methods.insert("fetch_user", |params: Option<RequestParams>| {
            let id = params
                .and_then(|p| p.get("user_id").cloned())
                .ok_or_else(|| RpcError::invalid_params("user_id is required"))?;
            Ok(json!({"user": id}))
        });
        let dispatcher =
            Dispatcher::with_config(DispatchConfig::default().convert_camel_case(true));
        let response = dispatcher.dispatch_value(
            &methods,
            json!({"jsonrpc": "2.0", "method": "fetchUser", "params": {"userId": 7}, "id": 1}),
        );
        assert_eq!(response.to_value().unwrap()["result"], json!({"user": 7}));
    }

    #[test]
    fn test_config_accessor() {
        let dispatcher = Dispatcher::with_config(
            DispatchConfig::new()
                .validate(false)
                .debug(true)
                .log_requests(false)
                .log_responses(false),
        );
        assert!(!dispatcher.config().validate);
        assert!(dispatcher.config().debug);
        assert!(!dispatcher.config().log_requests);
        assert!(!dispatcher.config().log_responses);
    }
}
