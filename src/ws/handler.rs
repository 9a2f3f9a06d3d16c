//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{Command, ConnectionId, GatewayEvent};
use crate::util::rate_limit::ChatRateLimiter;
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, Frame, ServerMsg};

/// Errors writing to a client socket
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to send message: {0}")]
    Send(#[from] axum::Error),
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id: ConnectionId = Uuid::new_v4();
    info!(connection_id = %connection_id, "New WebSocket connection");

    let (mut ws_sink, ws_stream) = socket.split();

    // Subscribe before the plane exists so its first update is not missed
    let update_rx = state.update_tx.subscribe();
    let chat_rx = state.chat_tx.subscribe();

    let welcome = ServerMsg::Welcome {
        connection_id,
        server_time: unix_millis(),
    };
    if let Err(e) = send_msg(&mut ws_sink, &welcome).await {
        error!(connection_id = %connection_id, error = %e, "Failed to send welcome");
        return;
    }

    if state
        .events_tx
        .send(GatewayEvent::Connect { connection_id })
        .await
        .is_err()
    {
        error!(connection_id = %connection_id, "Simulation is not running");
        return;
    }

    run_session(
        connection_id,
        ws_sink,
        ws_stream,
        state.events_tx.clone(),
        state.chat_tx.clone(),
        update_rx,
        chat_rx,
    )
    .await;

    info!(connection_id = %connection_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    connection_id: ConnectionId,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut ws_stream: SplitStream<WebSocket>,
    events_tx: mpsc::Sender<GatewayEvent>,
    chat_tx: broadcast::Sender<Frame>,
    mut update_rx: broadcast::Receiver<Frame>,
    mut chat_rx: broadcast::Receiver<Frame>,
) {
    let rate_limiter = ChatRateLimiter::default();

    // Spawn writer task: broadcast frames -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            let (channel, received) = tokio::select! {
                biased;
                received = chat_rx.recv() => ("chat", received),
                received = update_rx.recv() => ("update", received),
            };

            match received {
                Ok(frame) => {
                    if let Err(e) = send_frame(&mut ws_sink, &frame).await {
                        debug!(connection_id = %connection_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        connection_id = %connection_id,
                        channel,
                        lagged_count = n,
                        "Client lagged, skipping {} messages", n
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(connection_id = %connection_id, channel, "Broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> simulation
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMsg>(&text) {
                Ok(ClientMsg::Control(raw)) => match raw.parse::<Command>() {
                    Ok(command) => {
                        let event = GatewayEvent::Control {
                            connection_id,
                            command,
                        };
                        if events_tx.send(event).await.is_err() {
                            debug!(connection_id = %connection_id, "Event channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(connection_id = %connection_id, error = %e, "Ignoring control");
                    }
                },
                Ok(ClientMsg::ChatMessage(chat)) => {
                    if !rate_limiter.check() {
                        warn!(connection_id = %connection_id, "Rate limited chat message");
                        continue;
                    }
                    debug!(connection_id = %connection_id, user_id = %chat.user_id, "Chat message");
                    match ServerMsg::ChatMessage(chat).to_frame() {
                        Ok(frame) => {
                            let _ = chat_tx.send(frame);
                        }
                        Err(e) => {
                            error!(connection_id = %connection_id, error = %e, "Failed to serialize chat");
                        }
                    }
                }
                Err(e) => {
                    warn!(connection_id = %connection_id, error = %e, "Failed to parse client message");
                }
            },
            Ok(Message::Binary(_)) => {
                warn!(connection_id = %connection_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(connection_id = %connection_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(connection_id = %connection_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(connection_id = %connection_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Signal disconnect to the simulation
    let _ = events_tx
        .send(GatewayEvent::Disconnect { connection_id })
        .await;

    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), WsError> {
    let frame = msg.to_frame()?;
    send_frame(sink, &frame).await
}

/// Send an already serialized frame
async fn send_frame(sink: &mut SplitSink<WebSocket, Message>, frame: &str) -> Result<(), WsError> {
    sink.send(Message::Text(frame.to_owned())).await?;
    Ok(())
}
