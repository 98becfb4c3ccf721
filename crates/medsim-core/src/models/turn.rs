//! Results handed back to callers after a chat or answer turn.

use serde::{Deserialize, Serialize};

use super::state::PatientSnapshot;

/// Text returned for any action attempted after the patient has died.
pub const DECEASED_MESSAGE: &str =
    "The patient has died. No further actions can change the outcome.";

/// Where a patient reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Scripted,
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnswerReceipt {
    Evaluated {
        is_correct: bool,
        explanation: String,
        correct_index: usize,
        death_triggered: bool,
        snapshot: PatientSnapshot,
    },
    Deceased {
        message: String,
        snapshot: PatientSnapshot,
    },
}

impl AnswerReceipt {
    pub fn snapshot(&self) -> &PatientSnapshot {
        match self {
            Self::Evaluated { snapshot, .. } | Self::Deceased { snapshot, .. } => snapshot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChatReceipt {
    Replied {
        reply: String,
        source: ReplySource,
        snapshot: PatientSnapshot,
    },
    Deceased {
        message: String,
        snapshot: PatientSnapshot,
    },
}

impl ChatReceipt {
    pub fn snapshot(&self) -> &PatientSnapshot {
        match self {
            Self::Replied { snapshot, .. } | Self::Deceased { snapshot, .. } => snapshot,
        }
    }
}
