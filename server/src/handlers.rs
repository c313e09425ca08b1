use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use driftboard_shared::{ClientMessage, ServerMessage};

use crate::hub::{Hub, PeerSender, SubmitError};
use crate::sessions::{
    get_or_create_session, new_session_id, normalize_session_id, DEFAULT_SESSION,
};
use crate::state::AppState;
use crate::wire::{decode_binary, decode_text, encode};

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = new_session_id();
    let _ = get_or_create_session(&state, &session_id).await;
    Redirect::to(&format!("/s/{session_id}"))
}

pub async fn session_handler(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    let session_id = match normalize_session_id(&session_id) {
        Some(id) => id,
        None => return StatusCode::NOT_FOUND.into_response(),
    };
    let _ = get_or_create_session(&state, &session_id).await;
    match tokio::fs::read_to_string(&state.index_file).await {
        Ok(contents) => Html(contents).into_response(),
        Err(error) => {
            warn!(path = %state.index_file.display(), %error, "index file unreadable");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn default_ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, DEFAULT_SESSION.to_string()))
}

pub async fn ws_handler(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    let session_id = match normalize_session_id(&session_id) {
        Some(id) => id,
        None => return StatusCode::NOT_FOUND.into_response(),
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

/// One participant's view of a hub. Owns its outbound channel; a reconnect is
/// always a fresh `Connection`.
pub struct Connection {
    id: Uuid,
    session_id: String,
    hub: Arc<Hub>,
    tx: PeerSender,
    state: ConnectionState,
}

impl Connection {
    pub fn new(session_id: String, hub: Arc<Hub>, tx: PeerSender) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            hub,
            tx,
            state: ConnectionState::Connecting,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Queues the session history for this connection alone and joins fan-out.
    pub async fn open(&mut self) -> bool {
        if self.state != ConnectionState::Connecting {
            return false;
        }
        match self.hub.connect(self.id, self.tx.clone()).await {
            Some(segments) => {
                self.state = ConnectionState::Connected;
                let peers = self.hub.peer_count().await;
                info!(
                    session = %self.session_id,
                    conn = %self.id,
                    peers,
                    segments,
                    "ws connected"
                );
                true
            }
            None => {
                self.state = ConnectionState::Disconnected;
                false
            }
        }
    }

    pub async fn dispatch(&mut self, message: ClientMessage) {
        if self.state != ConnectionState::Connected {
            return;
        }
        match message {
            ClientMessage::Draw(segment) => match self.hub.submit(self.id, segment).await {
                Ok(delivery) => debug!(
                    session = %self.session_id,
                    conn = %self.id,
                    position = delivery.position,
                    recipients = delivery.recipients,
                    "draw accepted"
                ),
                Err(SubmitError::Invalid(error)) => warn!(
                    session = %self.session_id,
                    conn = %self.id,
                    %error,
                    "draw rejected"
                ),
                Err(error @ SubmitError::NotConnected(_)) => {
                    warn!(session = %self.session_id, %error, "draw from detached connection");
                    self.state = ConnectionState::Disconnected;
                }
            },
        }
    }

    pub async fn close(&mut self) {
        if self.state == ConnectionState::Disconnected {
            return;
        }
        let peers = self.hub.disconnect(self.id).await;
        self.state = ConnectionState::Disconnected;
        info!(session = %self.session_id, conn = %self.id, peers, "ws disconnected");
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, session_id: String) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let hub = get_or_create_session(&state, &session_id).await;
    let mut connection = Connection::new(session_id, hub, tx);
    if !connection.open().await {
        return;
    }
    let connection_id = connection.id();

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match encode(&message) {
                Ok(payload) => {
                    if socket_sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!(conn = %connection_id, kind = message.kind(), %error, "encode failed");
                }
            }
        }
    });

    while let Some(Ok(message)) = socket_receiver.next().await {
        let decoded = match message {
            Message::Text(text) => decode_text(&text),
            Message::Binary(data) => decode_binary(&data),
            Message::Close(frame) => {
                if let Some(frame) = frame {
                    debug!(conn = %connection_id, code = frame.code, reason = %frame.reason, "close frame");
                }
                break;
            }
            _ => continue,
        };
        match decoded {
            Ok(client_message) => connection.dispatch(client_message).await,
            Err(error) => warn!(conn = %connection_id, %error, "malformed frame dropped"),
        }
        if connection.state() == ConnectionState::Disconnected {
            break;
        }
    }

    connection.close().await;
    send_task.abort();
}

#[cfg(test)]
#[path = "handlers_test.rs"]
mod tests;
