//! WebSocket Transport Demo
//!
//! Accepts WebSocket connections and treats every text frame as a JSON-RPC
//! payload. Replies go back as text frames. Notifications produce no frame,
//! so fire-and-forget clients never see traffic they did not ask for.
//!
//! ```bash
//! cargo run -p websocket-server-demo
//! websocat ws://127.0.0.1:3001
//! {"jsonrpc": "2.0", "method": "subtract", "params": [42, 23], "id": 1}
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::{FutureExt, SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info};
use wirecall::{AsyncDispatcher, AsyncMethods, DispatchConfig, RequestParams, RpcError};

const BIND_ADDRESS: &str = "127.0.0.1:3001";

fn build_methods() -> AsyncMethods {
    let mut methods = AsyncMethods::new();
    methods.insert("subtract", |params: Option<RequestParams>| {
        async move {
            let (minuend, subtrahend): (i64, i64) = params
                .ok_or_else(|| RpcError::invalid_params("params are required"))?
                .parse()?;
            Ok(json!(minuend - subtrahend))
        }
        .boxed()
    });
    methods.insert("sleep_ms", |params: Option<RequestParams>| {
        async move {
            let millis = params
                .as_ref()
                .and_then(|params| params.get_index(0))
                .and_then(Value::as_u64)
                .unwrap_or(100);
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok(json!(millis))
        }
        .boxed()
    });
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
    let dispatcher = Arc::new(AsyncDispatcher::with_config(
        DispatchConfig::default().debug(true),
    ));

    let listener = TcpListener::bind(BIND_ADDRESS).await?;
    info!("JSON-RPC WebSocket server listening on {}", BIND_ADDRESS);

    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("accepted connection from {}", peer);
        tokio::spawn(handle_connection(
            stream,
            dispatcher.clone(),
            methods.clone(),
        ));
    }
}

async fn handle_connection(
    stream: TcpStream,
    dispatcher: Arc<AsyncDispatcher>,
    methods: Arc<AsyncMethods>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws_stream) => ws_stream,
        Err(err) => {
            error!("websocket handshake failed: {}", err);
            return;
        }
    };

    let (mut sender, mut receiver) = ws_stream.split();

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let response = dispatcher.dispatch_str(methods.as_ref(), text.as_str()).await;
                if let Some(reply) = response.to_json_string() {
                    if let Err(err) = sender.send(Message::text(reply)).await {
                        error!("error sending reply: {}", err);
                        break;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("connection closed by client");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                error!("websocket error: {}", err);
                break;
            }
        }
    }
}
