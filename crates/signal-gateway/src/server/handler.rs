//! WebSocket handler
//!
//! Handles WebSocket connections and frame dispatch. Each connection gets
//! a dedicated send task draining its outbound command channel, while the
//! receive loop feeds frames into the connection's session. Both the
//! client closing the transport and the liveness monitor queueing a close
//! command end up in the same cleanup path.

use crate::connection::Outbound;
use crate::server::GatewayState;
use crate::session::Session;
use axum::{
    extract::{ws::Message, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};

/// Channel buffer size for outgoing commands
const OUTBOUND_BUFFER_SIZE: usize = 256;

/// WebSocket signaling handler
pub async fn signaling_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: axum::extract::ws::WebSocket) {
    let connection_id = crate::connection::Connection::generate_id();

    let (tx, mut rx) = tokio::sync::mpsc::channel::<Outbound>(OUTBOUND_BUFFER_SIZE);
    let connection = state.connections().add(connection_id.clone(), tx);

    tracing::info!(connection = %connection_id, "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Drain outbound commands onto the socket. Ends when asked to close or
    // when every sender (session, registry links, liveness monitor) is gone.
    let connection_id_send = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            let result = match command {
                Outbound::Frame(text) => ws_sink.send(Message::Text(text)).await,
                Outbound::Probe => ws_sink.send(Message::Ping(Vec::new())).await,
                Outbound::Close => break,
            };
            if result.is_err() {
                tracing::debug!(
                    connection = %connection_id_send,
                    "failed to write to WebSocket"
                );
                break;
            }
        }

        let _ = ws_sink.close().await;
    });

    let mut session = Session::new(connection.clone(), state.registry().clone());

    loop {
        tokio::select! {
            incoming = ws_stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    session.handle_frame(&text);
                }
                Some(Ok(Message::Pong(_) | Message::Ping(_))) => {
                    // Pong replies are produced by axum automatically.
                    connection.mark_alive();
                }
                Some(Ok(Message::Binary(_))) => {
                    tracing::debug!(
                        connection = %connection_id,
                        "ignoring binary frame"
                    );
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!(connection = %connection_id, "client closed connection");
                    break;
                }
                Some(Err(error)) => {
                    tracing::warn!(
                        connection = %connection_id,
                        %error,
                        "WebSocket error"
                    );
                    break;
                }
            },
            _ = &mut send_task => {
                tracing::debug!(connection = %connection_id, "send task ended");
                break;
            }
        }
    }

    session.close();
    state.connections().remove(&connection_id);
    send_task.abort();

    tracing::info!(connection = %connection_id, "connection cleaned up");
}
