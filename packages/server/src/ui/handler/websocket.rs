//! WebSocket connection handlers.
//!
//! One connection = one reader task + one writer task ([`pusher_loop`]).
//! Whichever finishes first aborts the other, then the disconnect use case
//! runs exactly once. A fired [`TerminateSignal`] aborts both at once, even
//! when the writer is stuck on a peer that stopped reading.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{
        HeaderMap, StatusCode,
        header::{SEC_WEBSOCKET_KEY, SEC_WEBSOCKET_PROTOCOL},
    },
    response::Response,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::{Notify, mpsc};

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, OutboundFrame, TerminateSignal},
    infrastructure::dto::{ClientFrame, Handshake, ServerFrame, parse_handshake},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let Some(token) = headers
        .get(SEC_WEBSOCKET_PROTOCOL)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("Rejecting connection without a readable handshake token");
        return Err(StatusCode::BAD_REQUEST);
    };

    let candidate = ConnectionIdFactory::from_handshake_key(
        headers
            .get(SEC_WEBSOCKET_KEY)
            .and_then(|value| value.to_str().ok()),
    );
    let ws = ws.protocols([token.to_string()]);

    match parse_handshake(token) {
        Ok(handshake) => {
            Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, candidate, handshake)))
        }
        Err(e) => match e.notice() {
            Some(notice) => {
                tracing::warn!("Rejecting handshake with notice: {}", e);
                Ok(ws.on_upgrade(move |socket| reject_socket(socket, notice)))
            }
            None => {
                tracing::warn!("Rejecting malformed handshake: {}", e);
                Err(StatusCode::BAD_REQUEST)
            }
        },
    }
}

/// Send a single notice frame, then close without registering the connection.
async fn reject_socket(mut socket: WebSocket, notice: ServerFrame) {
    match notice.encode() {
        Ok(text) => {
            if let Err(e) = socket.send(Message::Text(text.into())).await {
                tracing::debug!("Failed to send notice: {}", e);
                return;
            }
        }
        Err(e) => tracing::error!("Failed to encode notice: {}", e),
    }
    let _ = socket.send(Message::Close(None)).await;
}

/// Spawns a task that drains the connection's outbound channel into the
/// WebSocket sink.
///
/// A [`OutboundFrame::Close`] sends a close frame and ends the task, which in
/// turn ends the connection.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                OutboundFrame::Text(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                OutboundFrame::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    candidate: ConnectionId,
    handshake: Handshake,
) {
    let (sender, receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let terminate: TerminateSignal = Arc::new(Notify::new());

    let id = state
        .connect_member_usecase
        .register(candidate, tx, terminate.clone())
        .await;
    let mut send_task = pusher_loop(rx, sender);

    if state
        .connect_member_usecase
        .enter_party(&id, handshake)
        .await
        .is_err()
    {
        // badroom + close are already queued; the heartbeat still reaps a peer that never drains them
        tokio::select! {
            _ = &mut send_task => {}
            _ = terminate.notified() => {
                tracing::debug!("Connection '{}' terminated before badroom was delivered", id);
                send_task.abort();
            }
        }
        state.disconnect_member_usecase.execute(&id).await;
        return;
    }

    let mut recv_task = tokio::spawn(reader_loop(receiver, state.clone(), id.clone()));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
        _ = terminate.notified() => {
            tracing::debug!("Connection '{}' terminated", id);
            recv_task.abort();
            send_task.abort();
        }
    };

    state.disconnect_member_usecase.execute(&id).await;
}

async fn reader_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    id: ConnectionId,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!("WebSocket error on '{}': {}", id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => dispatch_frame(&state, &id, text.as_str()).await,
            Message::Close(_) => {
                tracing::debug!("Connection '{}' requested close", id);
                break;
            }
            // binary frames carry nothing in this protocol; ping/pong is the transport's
            _ => {}
        }
    }
}

async fn dispatch_frame(state: &AppState, id: &ConnectionId, text: &str) {
    match ClientFrame::parse(text) {
        Some(ClientFrame::Chat(body)) => {
            state.relay_message_usecase.relay_chat(id, body).await;
        }
        Some(ClientFrame::Command(body)) => {
            state.relay_message_usecase.relay_command(id, body).await;
        }
        Some(ClientFrame::ToggleHost(target)) => {
            state.toggle_host_usecase.execute(id, target).await;
        }
        Some(ClientFrame::Pong) => {
            state.heartbeat_usecase.record_pong(id).await;
        }
        None => tracing::trace!("Dropping unrecognised frame from '{}'", id),
    }
}
