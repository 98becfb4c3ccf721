use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::delta::DeltaSpec;
use super::vitals::VitalSet;

/// Consecutive wrong answers that kill the patient when a case omits it.
pub const DEFAULT_MAX_CONSECUTIVE_WRONG: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Critical,
    Severe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub name: String,
    pub age: u32,
    pub gender: String,
}

/// A multiple-choice diagnostic question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqItem {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    pub explanation: String,
}

/// How the patient responds to the learner's decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    #[serde(default = "default_max_consecutive_wrong")]
    pub max_consecutive_wrong: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_wrong_mcq: Option<DeltaSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_correct_diagnosis: Option<DeltaSpec>,
}

fn default_max_consecutive_wrong() -> u32 {
    DEFAULT_MAX_CONSECUTIVE_WRONG
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            max_consecutive_wrong: DEFAULT_MAX_CONSECUTIVE_WRONG,
            on_wrong_mcq: None,
            on_correct_diagnosis: None,
        }
    }
}

/// A static simulated-patient scenario. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub difficulty: Difficulty,
    pub patient: PatientProfile,
    pub chief_complaint: String,
    pub initial_vitals: VitalSet,
    #[serde(default)]
    pub medical_history: BTreeMap<String, String>,
    #[serde(default)]
    pub allergies: BTreeMap<String, String>,
    #[serde(default)]
    pub medications: BTreeMap<String, String>,
    /// Scripted question → answer pairs, matched verbatim.
    #[serde(default)]
    pub triggers: BTreeMap<String, String>,
    pub mcqs: Vec<McqItem>,
    #[serde(default)]
    pub progression: Progression,
}

impl Case {
    pub fn question(&self, question_id: &str) -> Option<&McqItem> {
        self.mcqs.iter().find(|q| q.id == question_id)
    }

    pub fn scripted_reply(&self, question: &str) -> Option<&str> {
        self.triggers.get(question).map(String::as_str)
    }

    pub fn summary(&self) -> CaseSummary {
        CaseSummary {
            id: self.id.clone(),
            difficulty: self.difficulty,
            patient_name: self.patient.name.clone(),
            chief_complaint: self.chief_complaint.clone(),
            question_count: self.mcqs.len(),
        }
    }

    /// Learner-facing view of the case, with answer keys removed.
    pub fn public_view(&self) -> PublicCase {
        PublicCase {
            id: self.id.clone(),
            difficulty: self.difficulty,
            patient: self.patient.clone(),
            chief_complaint: self.chief_complaint.clone(),
            initial_vitals: self.initial_vitals.clone(),
            medical_history: self.medical_history.clone(),
            allergies: self.allergies.clone(),
            medications: self.medications.clone(),
            suggested_questions: self.triggers.keys().cloned().collect(),
            mcqs: self
                .mcqs
                .iter()
                .map(|q| McqPrompt {
                    id: q.id.clone(),
                    question: q.question.clone(),
                    options: q.options.clone(),
                })
                .collect(),
            max_consecutive_wrong: self.progression.max_consecutive_wrong,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: String,
    pub difficulty: Difficulty,
    pub patient_name: String,
    pub chief_complaint: String,
    pub question_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqPrompt {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicCase {
    pub id: String,
    pub difficulty: Difficulty,
    pub patient: PatientProfile,
    pub chief_complaint: String,
    pub initial_vitals: VitalSet,
    pub medical_history: BTreeMap<String, String>,
    pub allergies: BTreeMap<String, String>,
    pub medications: BTreeMap<String, String>,
    pub suggested_questions: Vec<String>,
    pub mcqs: Vec<McqPrompt>,
    pub max_consecutive_wrong: u32,
}
