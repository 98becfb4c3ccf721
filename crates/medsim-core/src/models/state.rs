use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::case::Case;
use super::vitals::VitalSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    Stable,
    Deteriorating,
    Critical,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    Doctor,
    Patient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: Timestamp,
    /// Player who asked, in multiplayer rooms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// A typed entry in the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    McqAnswer {
        question_id: String,
        chosen_index: usize,
        was_correct: bool,
        timestamp: Timestamp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
    },
}

/// The mutable simulation state shared by solo sessions and rooms.
///
/// A session owns one of these; a room holds exactly one that every
/// player acts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientState {
    pub vitals: VitalSet,
    pub chat_log: Vec<ChatEntry>,
    pub events: Vec<SimEvent>,
    pub wrong_count: u32,
    pub consecutive_wrong: u32,
    pub max_consecutive_wrong: u32,
    pub status: PatientStatus,
    pub is_dead: bool,
    pub score: u32,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
}

impl PatientState {
    /// Fresh state for `case`, with vitals copied from the definition.
    pub fn new(case: &Case, now: Timestamp) -> Self {
        Self {
            vitals: case.initial_vitals.clone(),
            chat_log: Vec::new(),
            events: Vec::new(),
            wrong_count: 0,
            consecutive_wrong: 0,
            max_consecutive_wrong: case.progression.max_consecutive_wrong,
            status: PatientStatus::Stable,
            is_dead: false,
            score: 0,
            started_at: now,
            ended_at: None,
        }
    }

    /// Correct and wrong MCQ answer counts, from the event log.
    pub fn answer_counts(&self) -> (u32, u32) {
        self.events
            .iter()
            .fold((0, 0), |(correct, wrong), event| match event {
                SimEvent::McqAnswer {
                    was_correct: true, ..
                } => (correct + 1, wrong),
                SimEvent::McqAnswer {
                    was_correct: false, ..
                } => (correct, wrong + 1),
            })
    }

    /// Whole seconds from start until the end time, or `now` while running.
    pub fn elapsed_seconds(&self, now: Timestamp) -> i64 {
        let end = self.ended_at.unwrap_or(now);
        end.duration_since(self.started_at).as_secs().max(0)
    }

    pub fn snapshot(&self) -> PatientSnapshot {
        PatientSnapshot {
            vitals: self.vitals.clone(),
            status: self.status,
            is_dead: self.is_dead,
            score: self.score,
        }
    }
}

/// The slice of state returned after every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    pub vitals: VitalSet,
    pub status: PatientStatus,
    pub is_dead: bool,
    pub score: u32,
}
