use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::PatientState;

pub const ANONYMOUS_PLAYER: &str = "Anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Solo,
    Contest,
}

/// One learner's run through a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub case_id: String,
    pub mode: SessionMode,
    pub player_name: String,
    pub state: PatientState,
    pub completed: bool,
}
