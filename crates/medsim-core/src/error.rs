use thiserror::Error;
use uuid::Uuid;

use crate::models::room::RoomStatus;

/// Failures scoped to a single session, room or request.
///
/// None of these are fatal to the process: the shared stores stay usable.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("case not found: {case_id}")]
    CaseNotFound { case_id: String },

    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: Uuid },

    #[error("room not found: {room_id}")]
    RoomNotFound { room_id: Uuid },

    #[error("question not found: {question_id}")]
    QuestionNotFound { question_id: String },

    #[error("room {room_id} is full (capacity {capacity})")]
    RoomFull { room_id: Uuid, capacity: usize },

    #[error("room {room_id} is not accepting players (status {status:?})")]
    RoomNotJoinable { room_id: Uuid, status: RoomStatus },

    #[error("room {room_id} is not active (status {status:?})")]
    RoomNotActive { room_id: Uuid, status: RoomStatus },

    #[error("player {player_id} is not in room {room_id}")]
    PlayerNotInRoom { room_id: Uuid, player_id: String },

    #[error("session {session_id} is already completed")]
    SessionCompleted { session_id: Uuid },

    #[error("report for {id} is only available after completion")]
    ReportUnavailable { id: Uuid },

    #[error("invalid room capacity {capacity}: must be between 1 and {max}")]
    InvalidCapacity { capacity: usize, max: usize },
}

/// Coarse classification used by transports to pick a response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvalidInput,
}

impl SimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CaseNotFound { .. }
            | Self::SessionNotFound { .. }
            | Self::RoomNotFound { .. }
            | Self::QuestionNotFound { .. } => ErrorKind::NotFound,
            Self::RoomFull { .. }
            | Self::RoomNotJoinable { .. }
            | Self::RoomNotActive { .. }
            | Self::PlayerNotInRoom { .. }
            | Self::SessionCompleted { .. }
            | Self::ReportUnavailable { .. } => ErrorKind::InvalidState,
            Self::InvalidCapacity { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// Errors raised while loading and validating case definitions.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read case file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse case definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid case {case_id}: {reason}")]
    Invalid { case_id: String, reason: String },

    #[error("duplicate case id: {0}")]
    Duplicate(String),
}

impl CatalogError {
    pub(crate) fn invalid(case_id: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            case_id: case_id.to_string(),
            reason: reason.into(),
        }
    }
}
