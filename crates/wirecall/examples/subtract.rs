//! Subtract Service Example
//!
//! Registers a couple of arithmetic methods and feeds the dispatcher the
//! request shapes a transport would hand it: positional params, named
//! params, a notification, and a batch.

use serde_json::{Value, json};
use wirecall::{DispatchConfig, Dispatcher, MethodResult, Methods, RequestParams, RpcError};

fn subtract(params: Option<RequestParams>) -> MethodResult {
    let params = params.ok_or_else(|| RpcError::invalid_params("params are required"))?;
    let (minuend, subtrahend): (i64, i64) = match &params {
        RequestParams::Array(_) => params.parse()?,
        RequestParams::Object(_) => {
            let field = |name: &str| {
                params
                    .get(name)
                    .and_then(Value::as_i64)
                    .ok_or_else(|| RpcError::invalid_params(format!("{name} is required")))
            };
            (field("minuend")?, field("subtrahend")?)
        }
    };
    Ok(json!(minuend - subtrahend))
}

fn main() {
    let mut methods = Methods::new();
    methods.insert("subtract", subtract);
    methods.insert("ping", |_: Option<RequestParams>| Ok(json!("pong")));

    let dispatcher = Dispatcher::with_config(DispatchConfig::default().debug(true));

    let requests = [
        r#"{"jsonrpc": "2.0", "method": "subtract", "params": [42, 23], "id": 1}"#,
        r#"{"jsonrpc": "2.0", "method": "subtract", "params": {"minuend": 42, "subtrahend": 23}, "id": 2}"#,
        r#"{"jsonrpc": "2.0", "method": "ping"}"#,
        r#"[{"jsonrpc": "2.0", "method": "ping", "id": "a"}, {"jsonrpc": "2.0", "method": "nope", "id": "b"}]"#,
        r#"{"jsonrpc": "2.0", "method":"#,
    ];

    for request in requests {
        println!("--> {request}");
        match dispatcher.dispatch_str(&methods, request).to_json_string() {
            Some(reply) => println!("<-- {reply}"),
            None => println!("<-- (no reply)"),
        }
        println!();
    }
}
