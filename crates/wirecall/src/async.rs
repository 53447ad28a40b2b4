//! Async twins of the method, registry, and dispatcher types.
//!
//! Semantics are identical to the synchronous pipeline. The one addition:
//! batch items run concurrently, with the final batch still ordered by
//! input position.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, join_all};
use serde_json::Value;

use crate::dispatch::{DispatchConfig, log_request_payload, log_response_payload};
use crate::error::RpcError;
use crate::methods::MethodResult;
use crate::request::{Request, RequestParams, wrap_outcome};
use crate::response::{BatchResponse, Response};

/// An awaitable callable the dispatcher can invoke.
#[async_trait]
pub trait AsyncMethod: Send + Sync {
    async fn call(&self, params: Option<RequestParams>) -> MethodResult;
}

/// Closures returning boxed futures are async methods as-is.
#[async_trait]
impl<F> AsyncMethod for F
where
    F: Fn(Option<RequestParams>) -> BoxFuture<'static, MethodResult> + Send + Sync,
{
    async fn call(&self, params: Option<RequestParams>) -> MethodResult {
        self(params).await
    }
}

/// Name-to-callable lookup for the async pipeline.
pub trait AsyncMethodRegistry {
    fn lookup(&self, name: &str) -> Option<&dyn AsyncMethod>;
}

/// The async registry you get out of the box. Entries are `Arc`ed so one
/// implementation can serve several names.
#[derive(Default)]
pub struct AsyncMethods {
    items: HashMap<String, Arc<dyn AsyncMethod>>,
}

impl AsyncMethods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method under a name, replacing any previous entry.
    pub fn insert<M>(&mut self, name: impl Into<String>, method: M) -> &mut Self
    where
        M: AsyncMethod + 'static,
    {
        self.items.insert(name.into(), Arc::new(method));
        self
    }

    /// Register one method under several names.
    pub fn insert_many<M>(&mut self, names: Vec<String>, method: M) -> &mut Self
    where
        M: AsyncMethod + 'static,
    {
        let shared: Arc<dyn AsyncMethod> = Arc::new(method);
        for name in names {
            self.items.insert(name, shared.clone());
        }
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl AsyncMethodRegistry for AsyncMethods {
    fn lookup(&self, name: &str) -> Option<&dyn AsyncMethod> {
        self.items.get(name).map(Arc::as_ref)
    }
}

impl AsyncMethodRegistry for HashMap<String, Arc<dyn AsyncMethod>> {
    fn lookup(&self, name: &str) -> Option<&dyn AsyncMethod> {
        self.get(name).map(Arc::as_ref)
    }
}

/// Async counterpart of [`Dispatcher`](crate::dispatch::Dispatcher).
#[derive(Debug, Clone, Default)]
pub struct AsyncDispatcher {
    config: DispatchConfig,
}

impl AsyncDispatcher {
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
    pub async fn dispatch_str<R>(&self, registry: &R, request: &str) -> Response
    where
        R: AsyncMethodRegistry + ?Sized + Sync,
    {
        log_request_payload(&self.config, &request);
        let response = match serde_json::from_str::<Value>(request) {
            Ok(decoded) => self.dispatch_decoded(registry, decoded).await,
            Err(_) => Response::error(&RpcError::parse_error(), None, self.config.debug),
        };
        log_response_payload(&self.config, &response);
        response
    }

    /// Process an already-decoded value.
    pub async fn dispatch_value<R>(&self, registry: &R, request: Value) -> Response
    where
        R: AsyncMethodRegistry + ?Sized + Sync,
    {
        log_request_payload(&self.config, &request);
        let response = self.dispatch_decoded(registry, request).await;
        log_response_payload(&self.config, &response);
        response
    }

    async fn dispatch_decoded<R>(&self, registry: &R, request: Value) -> Response
    where
        R: AsyncMethodRegistry + ?Sized + Sync,
    {
        match request {
            Value::Array(items) => self.dispatch_batch(registry, items).await,
            single => self.dispatch_single(registry, single).await,
        }
    }

    async fn dispatch_single<R>(&self, registry: &R, request: Value) -> Response
    where
        R: AsyncMethodRegistry + ?Sized + Sync,
    {
        match Request::from_value(request, &self.config) {
            Ok(request) => {
                let Request {
                    method, params, id, ..
                } = request;
                let outcome = match registry.lookup(&method) {
                    Some(callable) => callable.call(params).await,
                    None => Err(RpcError::method_not_found(method.as_str())),
                };
                wrap_outcome(&method, outcome, id, &self.config)
            }
            Err(error) => Response::error(&error, None, self.config.debug),
        }
    }

    /// Batch items run concurrently; `join_all` keeps the outputs in input
    /// order, which the batch contract requires.
    async fn dispatch_batch<R>(&self, registry: &R, items: Vec<Value>) -> Response
    where
        R: AsyncMethodRegistry + ?Sized + Sync,
    {
        if items.is_empty() {
            return Response::error(&RpcError::invalid_request(None), None, self.config.debug);
        }
        let responses = join_all(
            items
                .into_iter()
                .map(|item| self.dispatch_single(registry, item)),
        )
        .await;
        let batch: BatchResponse = responses.into_iter().collect();
        let batch = batch.without_notifications();
        if batch.is_empty() {
            Response::notification()
        } else {
            Response::Batch(batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;

    struct Repeater;

    #[async_trait]
    impl AsyncMethod for Repeater {
        async fn call(&self, params: Option<RequestParams>) -> MethodResult {
            let text: (String, i64) = params
                .ok_or_else(|| RpcError::invalid_params("params are required"))?
                .parse()?;
            Ok(json!(text.0.repeat(text.1 as usize)))
        }
    }

    fn registry() -> AsyncMethods {
        let mut methods = AsyncMethods::new();
        methods.insert("repeat", Repeater);
        methods.insert("sum", |params: Option<RequestParams>| {
            async move {
                let terms: Vec<i64> = match params {
                    Some(p) => p.parse()?,
                    None => vec![],
                };
                Ok(json!(terms.iter().sum::<i64>()))
            }
            .boxed()
        });
        methods.insert(
            "fail",
            |_: Option<RequestParams>| -> BoxFuture<'static, MethodResult> {
                async { Err(RpcError::internal_error("boom")) }.boxed()
            },
        );
        methods
    }

    #[tokio::test]
    async fn test_async_dispatch_success() {
        let dispatcher = AsyncDispatcher::new();
        let response = dispatcher
            .dispatch_str(
                &registry(),
                r#"{"jsonrpc": "2.0", "method": "repeat", "params": ["ab", 3], "id": 1}"#,
            )
            .await;
        assert_eq!(
            response.to_json_string().unwrap(),
            r#"{"jsonrpc":"2.0","result":"ababab","id":1}"#
        );
    }

    #[tokio::test]
    async fn test_async_method_not_found() {
        let dispatcher = AsyncDispatcher::with_config(DispatchConfig::default().debug(true));
        let response = dispatcher
            .dispatch_value(
                &registry(),
                json!({"jsonrpc": "2.0", "method": "nonexistent", "id": "5"}),
            )
            .await;
        assert_eq!(
            response.to_value().unwrap(),
            json!({
                "jsonrpc": "2.0",
                "error": {"code": -32601, "message": "Method not found", "data": "nonexistent"},
                "id": "5"
            })
        );
    }

    #[tokio::test]
    async fn test_async_batch_order() {
        let dispatcher = AsyncDispatcher::new();
        let response = dispatcher
            .dispatch_value(
                &registry(),
                json!([
                    {"jsonrpc": "2.0", "method": "sum", "params": [1, 2, 4], "id": "1"},
                    {"jsonrpc": "2.0", "method": "fail"},
                    {"jsonrpc": "2.0", "method": "repeat", "params": ["x", 2], "id": "2"}
                ]),
            )
            .await;
        assert_eq!(
            response.to_value().unwrap(),
            json!([
                {"jsonrpc": "2.0", "result": 7, "id": "1"},
                {"jsonrpc": "2.0", "result": "xx", "id": "2"}
            ])
        );
    }

    #[tokio::test]
    async fn test_async_all_notifications() {
        let dispatcher = AsyncDispatcher::new();
        let response = dispatcher
            .dispatch_value(
                &registry(),
                json!([
                    {"jsonrpc": "2.0", "method": "sum", "params": [1]},
                    {"jsonrpc": "2.0", "method": "fail"}
                ]),
            )
            .await;
        assert!(response.is_notification());
    }

    #[tokio::test]
    async fn test_async_parse_and_empty_batch_errors() {
        let dispatcher = AsyncDispatcher::new();

        let parse = dispatcher.dispatch_str(&registry(), "{oops").await;
        assert_eq!(parse.to_value().unwrap()["error"]["code"], json!(-32700));

        let empty = dispatcher.dispatch_str(&registry(), "[]").await;
        assert_eq!(empty.to_value().unwrap()["error"]["code"], json!(-32600));
    }

    #[tokio::test]
    async fn test_insert_many_shares_one_method() {
        let mut methods = AsyncMethods::new();
        methods.insert_many(vec!["a".to_string(), "b".to_string()], Repeater);
        assert_eq!(methods.len(), 2);

        let dispatcher = AsyncDispatcher::new();
        for (name, id) in [("a", 1), ("b", 2)] {
            let response = dispatcher
                .dispatch_value(
                    &methods,
                    json!({"jsonrpc": "2.0", "method": name, "params": ["z", 1], "id": id}),
                )
                .await;
            assert_eq!(response.to_value().unwrap()["result"], json!("z"));
        }
    }
}
