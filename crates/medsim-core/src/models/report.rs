use serde::{Deserialize, Serialize};

use super::case::Difficulty;
use super::state::PatientStatus;
use super::vitals::VitalSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Survived,
    Deceased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedTime {
    pub minutes: i64,
    pub seconds: i64,
    pub total_seconds: i64,
}

impl ElapsedTime {
    pub fn from_seconds(total_seconds: i64) -> Self {
        Self {
            minutes: total_seconds / 60,
            seconds: total_seconds % 60,
            total_seconds,
        }
    }
}

/// One incorrect answer, with the question resolved from the case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedOpportunity {
    pub question_id: String,
    pub question: String,
    pub chosen_index: usize,
    pub correct_index: Option<usize>,
    pub explanation: String,
}

/// End-of-session debrief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub case_id: String,
    pub difficulty: Difficulty,
    pub patient_name: String,
    pub elapsed: ElapsedTime,
    pub score: u32,
    pub accuracy: f64,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub total_answers: u32,
    pub outcome: Outcome,
    pub final_status: PatientStatus,
    pub final_vitals: VitalSet,
    pub missed_opportunities: Vec<MissedOpportunity>,
    pub feedback: Vec<String>,
    pub summary: Vec<String>,
}
