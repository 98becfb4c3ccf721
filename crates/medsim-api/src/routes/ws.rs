//! Room WebSocket: every room event is pushed to the socket, and the client
//! may chat, answer or relay over the same connection.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

use medsim_core::models::room::RoomEvent;
use medsim_core::models::turn::{AnswerReceipt, ChatReceipt};

use crate::error::ApiError;
use crate::state::AppState;

/// Client messages queued per socket before new ones are refused.
pub const DISPATCH_BUFFER: usize = 16;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub player_id: String,
}

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Chat {
        question: String,
    },
    Answer {
        question_id: String,
        chosen_index: usize,
    },
    Relay {
        payload: serde_json::Value,
    },
}

/// Replies sent only to the client that made the request.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum DirectMessage {
    ChatResult { receipt: ChatReceipt },
    AnswerResult { receipt: AnswerReceipt },
    Error { error: String },
}

pub async fn room_socket(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    // Subscribe before upgrading so an unknown room is a plain 404.
    let events = state.rooms.subscribe(room_id).await?;
    let player_id = params.player_id;
    Ok(ws.on_upgrade(move |socket| run_socket(socket, state, room_id, player_id, events)))
}

async fn run_socket(
    socket: WebSocket,
    state: AppState,
    room_id: Uuid,
    player_id: String,
    mut events: broadcast::Receiver<RoomEvent>,
) {
    let (mut sender, mut receiver) = socket.split();
    let (requests, mut replies) = spawn_dispatcher(state, room_id, player_id.clone());
    debug!(%room_id, player_id = %player_id, "room socket opened");

    loop {
        tokio::select! {
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%room_id, player_id = %player_id, skipped, "room socket lagging, events dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if send_json(&mut sender, &event).await.is_err() {
                    break;
                }
            }
            reply = replies.recv() => {
                let Some(reply) = reply else { break };
                if send_json(&mut sender, &reply).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        debug!(%room_id, player_id = %player_id, error = %e, "room socket read failed");
                        break;
                    }
                };
                match requests.try_send(text.as_str().to_owned()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        let busy = DirectMessage::Error {
                            error: "too many pending requests".to_string(),
                        };
                        if send_json(&mut sender, &busy).await.is_err() {
                            break;
                        }
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        }
    }

    debug!(%room_id, player_id = %player_id, "room socket closed");
}

/// Start the worker that handles one socket's client messages.
///
/// Messages are handled one at a time in arrival order, off the socket
/// loop, so room events keep flowing while a chat reply is generated. The
/// worker stops once the request sender is dropped.
pub fn spawn_dispatcher(
    state: AppState,
    room_id: Uuid,
    player_id: String,
) -> (mpsc::Sender<String>, mpsc::Receiver<DirectMessage>) {
    let (requests, mut pending) = mpsc::channel::<String>(DISPATCH_BUFFER);
    let (reply_tx, replies) = mpsc::channel(DISPATCH_BUFFER);

    tokio::spawn(async move {
        while let Some(text) = pending.recv().await {
            let Some(reply) = handle_client_message(&state, room_id, &player_id, &text).await else {
                continue;
            };
            if reply_tx.send(reply).await.is_err() {
                break;
            }
        }
    });

    (requests, replies)
}

/// Dispatch one client message. Relays produce no direct reply.
pub async fn handle_client_message(
    state: &AppState,
    room_id: Uuid,
    player_id: &str,
    text: &str,
) -> Option<DirectMessage> {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            return Some(DirectMessage::Error {
                error: format!("invalid message: {e}"),
            });
        }
    };

    let result = match message {
        ClientMessage::Chat { question } if question.trim().is_empty() => {
            return Some(DirectMessage::Error {
                error: "question must not be empty".to_string(),
            });
        }
        ClientMessage::Chat { question } => state
            .rooms
            .room_chat(room_id, player_id, question.trim())
            .await
            .map(|receipt| Some(DirectMessage::ChatResult { receipt })),
        ClientMessage::Answer {
            question_id,
            chosen_index,
        } => state
            .rooms
            .room_answer(room_id, player_id, &question_id, chosen_index)
            .await
            .map(|receipt| Some(DirectMessage::AnswerResult { receipt })),
        ClientMessage::Relay { payload } => state
            .rooms
            .relay(room_id, player_id, payload)
            .await
            .map(|()| None),
    };

    result.unwrap_or_else(|e| {
        Some(DirectMessage::Error {
            error: e.to_string(),
        })
    })
}

async fn send_json<T: Serialize>(
    sender: &mut SplitSink<WebSocket, Message>,
    value: &T,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(value) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "failed to encode room socket message");
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await
}
