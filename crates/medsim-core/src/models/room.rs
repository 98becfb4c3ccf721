use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::report::Report;
use super::state::{ChatEntry, PatientSnapshot, PatientState, SimEvent};

pub const MAX_ROOM_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    TeamLead,
    PrimaryDoctor,
    SecondaryDoctor,
    Nurse,
    /// Anyone joining after the fixed roles are taken.
    Observer,
}

/// Roles handed out in join order.
pub const ROLE_ROTATION: [PlayerRole; 4] = [
    PlayerRole::TeamLead,
    PlayerRole::PrimaryDoctor,
    PlayerRole::SecondaryDoctor,
    PlayerRole::Nurse,
];

impl PlayerRole {
    pub fn for_join_order(index: usize) -> Self {
        ROLE_ROTATION
            .get(index)
            .copied()
            .unwrap_or(PlayerRole::Observer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub display_name: String,
    pub is_host: bool,
    pub role: PlayerRole,
    pub joined_at: Timestamp,
}

/// A multiplayer game around one shared patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub case_id: String,
    pub capacity: usize,
    pub host_id: String,
    pub players: Vec<Player>,
    pub status: RoomStatus,
    pub shared: PatientState,
    pub created_at: Timestamp,
}

impl Room {
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.capacity
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Display name used on the leaderboard: the host, or the first joiner.
    pub fn team_name(&self) -> String {
        self.players
            .iter()
            .find(|p| p.is_host)
            .or_else(|| self.players.first())
            .map(|p| format!("Team {}", p.display_name))
            .unwrap_or_else(|| format!("Room {}", self.id))
    }
}

/// Incremental view of the shared state sent after each room mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateUpdate {
    pub actor: String,
    pub snapshot: PatientSnapshot,
    pub wrong_count: u32,
    pub consecutive_wrong: u32,
    pub new_chat: Vec<ChatEntry>,
    pub new_events: Vec<SimEvent>,
}

/// Fan-out notification delivered to every participant of a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum RoomEvent {
    PlayerJoined { player: Player, player_count: usize },
    GameStarted { room: Box<Room> },
    UpdateState { update: StateUpdate },
    ChatRelay {
        player_id: String,
        payload: serde_json::Value,
    },
    GameEnded { report: Box<Report> },
}
