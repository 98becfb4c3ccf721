//! Multiplayer rooms around one shared patient.
//!
//! Each room carries a broadcast channel. Events are sent while the room's
//! lock is held, so subscribers see them in mutation order. A send with no
//! subscribers is not an error.

use std::sync::Arc;

use jiff::Timestamp;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use medsim_core::error::SimError;
use medsim_core::models::case::Case;
use medsim_core::models::leaderboard::LeaderboardEntry;
use medsim_core::models::report::Report;
use medsim_core::models::room::{
    Player, PlayerRole, Room, RoomEvent, RoomStatus, StateUpdate, MAX_ROOM_CAPACITY,
};
use medsim_core::models::session::ANONYMOUS_PLAYER;
use medsim_core::models::state::PatientState;
use medsim_core::models::turn::{AnswerReceipt, ChatReceipt};
use medsim_core::CaseCatalog;
use medsim_engine::{evaluate_answer, generate_report, leaderboard, score};

use crate::audit::AuditEvent;
use crate::router::{ConversationRouter, PendingReply};
use crate::sessions::{answer_receipt, deceased_chat};
use crate::store::KeyedStore;

/// Events buffered per subscriber before a slow one starts lagging.
pub const ROOM_EVENT_BUFFER: usize = 64;

struct RoomEntry {
    room: Room,
    case: Arc<Case>,
    events: broadcast::Sender<RoomEvent>,
}

impl RoomEntry {
    fn publish(&self, event: RoomEvent) {
        // Err only means nobody is listening right now.
        let _ = self.events.send(event);
    }

    fn ensure_active(&self) -> Result<(), SimError> {
        if self.room.status != RoomStatus::Active {
            return Err(SimError::RoomNotActive {
                room_id: self.room.id,
                status: self.room.status,
            });
        }
        Ok(())
    }

    fn ensure_member(&self, player_id: &str) -> Result<(), SimError> {
        if self.room.player(player_id).is_none() {
            return Err(SimError::PlayerNotInRoom {
                room_id: self.room.id,
                player_id: player_id.to_string(),
            });
        }
        Ok(())
    }

    /// Broadcast everything appended to the shared state since the given
    /// log lengths.
    fn publish_update(&self, actor: &str, chat_from: usize, events_from: usize) {
        let shared = &self.room.shared;
        self.publish(RoomEvent::UpdateState {
            update: StateUpdate {
                actor: actor.to_string(),
                snapshot: shared.snapshot(),
                wrong_count: shared.wrong_count,
                consecutive_wrong: shared.consecutive_wrong,
                new_chat: shared.chat_log[chat_from..].to_vec(),
                new_events: shared.events[events_from..].to_vec(),
            },
        });
    }
}

/// Outcome of a join, for logging after the lock is released.
enum JoinOutcome {
    Rejoined,
    Joined { activated: bool },
}

enum ChatStart {
    Done(ChatReceipt),
    Pending(PendingReply),
}

pub struct RoomCoordinator {
    catalog: Arc<CaseCatalog>,
    router: Arc<ConversationRouter>,
    rooms: KeyedStore<Uuid, RoomEntry>,
}

impl RoomCoordinator {
    pub fn new(catalog: Arc<CaseCatalog>, router: Arc<ConversationRouter>) -> Self {
        Self {
            catalog,
            router,
            rooms: KeyedStore::new(),
        }
    }

    /// Open a room waiting for `capacity` players.
    pub async fn create_room(
        &self,
        case_id: &str,
        capacity: usize,
        host_id: &str,
    ) -> Result<Room, SimError> {
        if !(1..=MAX_ROOM_CAPACITY).contains(&capacity) {
            return Err(SimError::InvalidCapacity {
                capacity,
                max: MAX_ROOM_CAPACITY,
            });
        }
        let case = self.catalog.get(case_id)?;
        let now = Timestamp::now();

        let room = Room {
            id: Uuid::new_v4(),
            case_id: case.id.clone(),
            capacity,
            host_id: host_id.to_string(),
            players: Vec::new(),
            status: RoomStatus::Waiting,
            shared: PatientState::new(&case, now),
            created_at: now,
        };
        let (events, _) = broadcast::channel(ROOM_EVENT_BUFFER);

        self.rooms
            .insert(
                room.id,
                RoomEntry {
                    room: room.clone(),
                    case,
                    events,
                },
            )
            .await;

        AuditEvent::new("room.created", "room", room.id, host_id)
            .with_details(json!({ "case_id": room.case_id, "capacity": capacity }))
            .emit();

        Ok(room)
    }

    /// Take a seat in a waiting room.
    ///
    /// The seat count check, the activation flip and the `gameStarted`
    /// broadcast all happen under the room lock, so exactly one join can
    /// fill the last seat. A player already seated gets the room back
    /// without taking another seat.
    pub async fn join_room(
        &self,
        room_id: Uuid,
        player_id: &str,
        display_name: Option<&str>,
    ) -> Result<Room, SimError> {
        let now = Timestamp::now();
        let (room, outcome) = self
            .rooms
            .mutate(&room_id, |entry| {
                if entry.room.player(player_id).is_some() {
                    return Ok((entry.room.clone(), JoinOutcome::Rejoined));
                }

                let room = &mut entry.room;
                // A completed room is always full; it reports as not joinable.
                if room.status == RoomStatus::Completed {
                    return Err(SimError::RoomNotJoinable {
                        room_id,
                        status: room.status,
                    });
                }
                if room.is_full() {
                    return Err(SimError::RoomFull {
                        room_id,
                        capacity: room.capacity,
                    });
                }
                if room.status != RoomStatus::Waiting {
                    return Err(SimError::RoomNotJoinable {
                        room_id,
                        status: room.status,
                    });
                }

                let is_host = room.players.is_empty();
                let player = Player {
                    id: player_id.to_string(),
                    display_name: display_name
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .unwrap_or(ANONYMOUS_PLAYER)
                        .to_string(),
                    is_host,
                    role: PlayerRole::for_join_order(room.players.len()),
                    joined_at: now,
                };
                if is_host {
                    room.host_id = player.id.clone();
                }
                room.players.push(player.clone());

                let activated = room.is_full();
                if activated {
                    room.status = RoomStatus::Active;
                    room.shared.started_at = now;
                    room.shared.score = score(&room.shared, now);
                }

                let player_count = room.players.len();
                let snapshot = room.clone();
                entry.publish(RoomEvent::PlayerJoined {
                    player,
                    player_count,
                });
                if activated {
                    entry.publish(RoomEvent::GameStarted {
                        room: Box::new(snapshot.clone()),
                    });
                }

                Ok((snapshot, JoinOutcome::Joined { activated }))
            })
            .await
            .ok_or(SimError::RoomNotFound { room_id })??;

        match outcome {
            JoinOutcome::Rejoined => {
                debug!(%room_id, player_id, "player rejoined room");
            }
            JoinOutcome::Joined { activated } => {
                AuditEvent::new("room.joined", "room", room_id, player_id)
                    .with_details(json!({ "players": room.players.len(), "capacity": room.capacity }))
                    .emit();
                if activated {
                    AuditEvent::new("room.activated", "room", room_id, player_id).emit();
                }
            }
        }

        Ok(room)
    }

    /// Receive every event published to the room from now on.
    pub async fn subscribe(&self, room_id: Uuid) -> Result<broadcast::Receiver<RoomEvent>, SimError> {
        self.rooms
            .read(&room_id, |entry| entry.events.subscribe())
            .await
            .ok_or(SimError::RoomNotFound { room_id })
    }

    /// Current room, with the score evaluated as of now while active.
    pub async fn get_room(&self, room_id: Uuid) -> Result<Room, SimError> {
        let now = Timestamp::now();
        self.rooms
            .read(&room_id, |entry| {
                let mut room = entry.room.clone();
                if room.status == RoomStatus::Active {
                    room.shared.score = score(&room.shared, now);
                }
                room
            })
            .await
            .ok_or(SimError::RoomNotFound { room_id })
    }

    /// Apply a player's answer to the shared patient.
    pub async fn room_answer(
        &self,
        room_id: Uuid,
        player_id: &str,
        question_id: &str,
        chosen_index: usize,
    ) -> Result<AnswerReceipt, SimError> {
        let now = Timestamp::now();
        let receipt = self
            .rooms
            .mutate(&room_id, |entry| -> Result<AnswerReceipt, SimError> {
                entry.ensure_active()?;
                entry.ensure_member(player_id)?;

                let chat_from = entry.room.shared.chat_log.len();
                let events_from = entry.room.shared.events.len();
                let evaluation = evaluate_answer(
                    &mut entry.room.shared,
                    &entry.case,
                    question_id,
                    chosen_index,
                    Some(player_id),
                    now,
                )?;
                let receipt = answer_receipt(evaluation, &entry.room.shared);

                if matches!(receipt, AnswerReceipt::Evaluated { .. }) {
                    entry.publish_update(player_id, chat_from, events_from);
                }
                Ok(receipt)
            })
            .await
            .ok_or(SimError::RoomNotFound { room_id })??;

        if let AnswerReceipt::Evaluated {
            is_correct,
            death_triggered,
            ..
        } = &receipt
        {
            AuditEvent::new("answer.submitted", "room", room_id, player_id)
                .with_details(json!({
                    "question_id": question_id,
                    "chosen_index": chosen_index,
                    "is_correct": is_correct,
                    "death_triggered": death_triggered,
                }))
                .emit();
        }

        Ok(receipt)
    }

    /// Ask the shared patient a question on behalf of a player.
    pub async fn room_chat(
        &self,
        room_id: Uuid,
        player_id: &str,
        question: &str,
    ) -> Result<ChatReceipt, SimError> {
        let start = self
            .rooms
            .read(&room_id, |entry| -> Result<ChatStart, SimError> {
                entry.ensure_active()?;
                entry.ensure_member(player_id)?;
                let shared = &entry.room.shared;
                if shared.is_dead {
                    return Ok(ChatStart::Done(deceased_chat(shared)));
                }
                Ok(ChatStart::Pending(self.router.prepare(
                    &entry.case,
                    shared,
                    question,
                )))
            })
            .await
            .ok_or(SimError::RoomNotFound { room_id })??;

        let pending = match start {
            ChatStart::Done(receipt) => return Ok(receipt),
            ChatStart::Pending(pending) => pending,
        };

        let (reply, source) = self.router.resolve(pending).await;

        let now = Timestamp::now();
        self.rooms
            .mutate(&room_id, |entry| -> Result<ChatReceipt, SimError> {
                entry.ensure_active()?;
                if entry.room.shared.is_dead {
                    return Ok(deceased_chat(&entry.room.shared));
                }

                let chat_from = entry.room.shared.chat_log.len();
                let events_from = entry.room.shared.events.len();
                let shared = &mut entry.room.shared;
                ConversationRouter::record_turn(shared, question, &reply, Some(player_id), now);
                shared.score = score(shared, now);
                let snapshot = shared.snapshot();

                entry.publish_update(player_id, chat_from, events_from);
                Ok(ChatReceipt::Replied {
                    reply,
                    source,
                    snapshot,
                })
            })
            .await
            .ok_or(SimError::RoomNotFound { room_id })?
    }

    /// Fan an opaque message out to the room without touching its state.
    pub async fn relay(
        &self,
        room_id: Uuid,
        player_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), SimError> {
        self.rooms
            .read(&room_id, |entry| -> Result<(), SimError> {
                entry.ensure_member(player_id)?;
                entry.publish(RoomEvent::ChatRelay {
                    player_id: player_id.to_string(),
                    payload,
                });
                Ok(())
            })
            .await
            .ok_or(SimError::RoomNotFound { room_id })?
    }

    /// Complete an active room, broadcast `gameEnded`, and return the report.
    ///
    /// Idempotent once completed. A room that never started cannot be ended.
    pub async fn end_room(&self, room_id: Uuid) -> Result<Report, SimError> {
        let now = Timestamp::now();
        let (report, newly_ended) = self
            .rooms
            .mutate(&room_id, |entry| {
                let room = &mut entry.room;
                match room.status {
                    RoomStatus::Waiting => {
                        return Err(SimError::RoomNotActive {
                            room_id,
                            status: room.status,
                        });
                    }
                    RoomStatus::Completed => {
                        return Ok((generate_report(&room.shared, &entry.case, now), false));
                    }
                    RoomStatus::Active => {}
                }

                room.status = RoomStatus::Completed;
                room.shared.ended_at = Some(now);
                room.shared.score = score(&room.shared, now);
                let report = generate_report(&room.shared, &entry.case, now);

                entry.publish(RoomEvent::GameEnded {
                    report: Box::new(report.clone()),
                });
                Ok((report, true))
            })
            .await
            .ok_or(SimError::RoomNotFound { room_id })??;

        if newly_ended {
            AuditEvent::new("room.ended", "room", room_id, "team")
                .with_details(json!({ "score": report.score, "outcome": report.outcome }))
                .emit();
        }

        Ok(report)
    }

    /// Report for a room that has already been ended.
    pub async fn report(&self, room_id: Uuid) -> Result<Report, SimError> {
        let now = Timestamp::now();
        self.rooms
            .read(&room_id, |entry| {
                if entry.room.status != RoomStatus::Completed {
                    return Err(SimError::ReportUnavailable { id: room_id });
                }
                Ok(generate_report(&entry.room.shared, &entry.case, now))
            })
            .await
            .ok_or(SimError::RoomNotFound { room_id })?
    }

    /// Unranked leaderboard projections of every completed room.
    pub async fn leaderboard_entries(&self) -> Vec<LeaderboardEntry> {
        self.rooms
            .collect(|entry| leaderboard::room_entry(&entry.room, &entry.case))
            .await
    }
}
