//! HTTP Transport Demo
//!
//! Serves a method registry over plain HTTP/1.1. POST a JSON-RPC body to `/`
//! and the reply comes back as `application/json`, or as `204 No Content`
//! when the input was a notification.
//!
//! ```bash
//! cargo run -p http-server-demo
//! curl -s -X POST 127.0.0.1:3000 -d '{"jsonrpc": "2.0", "method": "subtract", "params": [42, 23], "id": 1}'
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use wirecall::{DispatchConfig, Dispatcher, Methods, RequestParams, RpcError};

const BIND_ADDRESS: &str = "127.0.0.1:3000";

fn build_methods() -> Methods {
    let mut methods = Methods::new();
    methods.insert("subtract", |params: Option<RequestParams>| {
        let (minuend, subtrahend): (i64, i64) = params
            .ok_or_else(|| RpcError::invalid_params("params are required"))?
            .parse()?;
        Ok(json!(minuend - subtrahend))
    });
    methods.insert("sum", |params: Option<RequestParams>| {
        let terms: Vec<f64> = match params {
            Some(params) => params.parse()?,
            None => vec![],
        };
        Ok(json!(terms.iter().sum::<f64>()))
    });
    methods.insert("ping", |_: Option<RequestParams>| Ok(json!("pong")));
    methods
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,wirecall=debug")),
        )
        .init();

    let methods = Arc::new(build_methods());
    let dispatcher = Arc::new(Dispatcher::with_config(DispatchConfig::default().debug(true)));

    let listener = TcpListener::bind(BIND_ADDRESS).await?;
    info!("JSON-RPC HTTP server listening on {}", BIND_ADDRESS);
    info!("registered methods: {}", methods.names().join(", "));

    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("accepted connection from {}", peer);

        let methods = methods.clone();
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                let methods = methods.clone();
                let dispatcher = dispatcher.clone();
                async move { handle_request(req, &dispatcher, &methods).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                let err_str = err.to_string();
                if err_str.contains("connection closed before message completed") {
                    debug!("client disconnected: {}", err);
                } else {
                    error!("error serving connection: {}", err);
                }
            }
        });
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    dispatcher: &Dispatcher,
    methods: &Methods,
) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.method() != Method::POST {
        return Ok(plain_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed",
        ));
    }
    if req.uri().path() != "/" {
        return Ok(plain_response(StatusCode::NOT_FOUND, "Not Found"));
    }

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            error!("failed to read request body: {}", err);
            return Ok(plain_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ));
        }
    };

    let request_text = String::from_utf8_lossy(&body);
    let response = dispatcher.dispatch_str(methods, &request_text);
    let status = response.http_status();

    Ok(match response.to_json_string() {
        Some(payload) => Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(payload)))
            .unwrap(),
        None => Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Full::new(Bytes::new()))
            .unwrap(),
    })
}

fn plain_response(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(message)))
        .unwrap()
}
