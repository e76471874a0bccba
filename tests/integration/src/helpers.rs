//! Test helpers for integration tests
//!
//! Provides utilities for spawning a gateway on an ephemeral port and
//! driving it with real WebSocket clients.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use signal_common::AppConfig;
use signal_gateway::{create_app, create_gateway_state, GatewayState};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long a test waits for a frame before giving up
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Gateway instance bound to an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: GatewayState,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a gateway with the default test configuration
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a gateway with custom config (short heartbeat intervals etc.)
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_gateway_state(config);
        let app = create_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            signal_gateway::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// WebSocket endpoint URL
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

/// Create a test configuration with defaults
pub fn test_config() -> AppConfig {
    AppConfig::default()
}

/// One WebSocket client connected to a test server
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect to the server's signaling endpoint
    pub async fn connect(server: &TestServer) -> Result<Self> {
        let (ws, _response) = connect_async(server.ws_url()).await?;
        Ok(Self { ws })
    }

    /// Send one JSON text frame
    pub async fn send_json(&mut self, value: &Value) -> Result<()> {
        self.ws.send(Message::Text(value.to_string())).await?;
        Ok(())
    }

    /// Receive the next JSON text frame, skipping control frames.
    /// Fails if nothing arrives within the timeout.
    pub async fn recv_json(&mut self) -> Result<Value> {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        loop {
            let remaining = deadline
                .checked_duration_since(tokio::time::Instant::now())
                .unwrap_or_default();
            let frame = tokio::time::timeout(remaining, self.ws.next())
                .await
                .map_err(|_| anyhow::anyhow!("timed out waiting for a frame"))?;

            match frame {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(_)) => {}
                Some(Err(e)) => anyhow::bail!("WebSocket error: {e}"),
                None => anyhow::bail!("connection closed while waiting for a frame"),
            }
        }
    }

    /// Assert that no text frame arrives within the given window
    pub async fn expect_silence(&mut self, window: Duration) -> Result<()> {
        let result = tokio::time::timeout(window, async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Text(text))) => return Some(text),
                    Some(Ok(_)) => {}
                    _ => return None,
                }
            }
        })
        .await;

        match result {
            Err(_) | Ok(None) => Ok(()),
            Ok(Some(text)) => anyhow::bail!("expected silence, received: {text}"),
        }
    }

    /// Join a room with the common test defaults
    pub async fn join(&mut self, room: &str, id: &str, name: &str) -> Result<Value> {
        self.send_json(&serde_json::json!({
            "type": "join",
            "room": room,
            "id": id,
            "name": name,
            "role": "listener",
        }))
        .await?;
        self.recv_json().await
    }

    /// Close the connection cleanly
    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}

/// Poll a condition until it holds or the timeout expires
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
