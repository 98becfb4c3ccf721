//! Prompt context for simulated-patient replies.
//!
//! A [`ReplyContext`] is an owned snapshot taken while the caller still holds
//! the session or room. Generation runs later, off the lock, from the
//! snapshot alone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use medsim_core::models::case::{Case, PatientProfile};
use medsim_core::models::state::{ChatEntry, ChatRole, PatientState, PatientStatus};
use medsim_core::models::vitals::{VitalField, VitalSet};

/// Everything the generator may see about the current turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyContext {
    pub case_id: String,
    pub patient: PatientProfile,
    pub chief_complaint: String,
    pub medical_history: BTreeMap<String, String>,
    pub allergies: BTreeMap<String, String>,
    pub medications: BTreeMap<String, String>,
    pub vitals: VitalSet,
    pub status: PatientStatus,
    /// Trailing chat history, oldest first.
    pub history: Vec<ChatEntry>,
    pub question: String,
}

impl ReplyContext {
    /// Capture the case facts, current vitals and the last `window` chat
    /// entries of `state`.
    pub fn capture(case: &Case, state: &PatientState, question: &str, window: usize) -> Self {
        let skip = state.chat_log.len().saturating_sub(window);
        Self {
            case_id: case.id.clone(),
            patient: case.patient.clone(),
            chief_complaint: case.chief_complaint.clone(),
            medical_history: case.medical_history.clone(),
            allergies: case.allergies.clone(),
            medications: case.medications.clone(),
            vitals: state.vitals.clone(),
            status: state.status,
            history: state.chat_log[skip..].to_vec(),
            question: question.to_string(),
        }
    }
}

/// A single turn in the model conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTurn {
    pub from_learner: bool,
    pub text: String,
}

/// Build the `<patient_record>` block describing the case and live vitals.
pub fn build_patient_record(ctx: &ReplyContext) -> String {
    let mut block = String::from("<patient_record>\n");

    block.push_str(&format!(
        "<profile name=\"{}\" age=\"{}\" gender=\"{}\" />\n",
        ctx.patient.name, ctx.patient.age, ctx.patient.gender
    ));
    block.push_str(&format!(
        "<chief_complaint>{}</chief_complaint>\n",
        ctx.chief_complaint
    ));

    push_section(&mut block, "medical_history", &ctx.medical_history);
    push_section(&mut block, "allergies", &ctx.allergies);
    push_section(&mut block, "medications", &ctx.medications);

    block.push_str("<vitals>\n");
    for field in VitalField::ALL {
        block.push_str(&format!(
            "{}: {}\n",
            field.as_str(),
            ctx.vitals.field(field)
        ));
    }
    block.push_str("</vitals>\n");

    block.push_str(&format!("<condition>{}</condition>\n", status_word(ctx.status)));
    block.push_str("</patient_record>");
    block
}

fn push_section(block: &mut String, tag: &str, entries: &BTreeMap<String, String>) {
    if entries.is_empty() {
        return;
    }
    block.push_str(&format!("<{tag}>\n"));
    for (key, value) in entries {
        block.push_str(&format!("{key}: {value}\n"));
    }
    block.push_str(&format!("</{tag}>\n"));
}

fn status_word(status: PatientStatus) -> &'static str {
    match status {
        PatientStatus::Stable => "stable",
        PatientStatus::Deteriorating => "deteriorating",
        PatientStatus::Critical => "critical",
        PatientStatus::Dead => "dead",
    }
}

/// System prompt: role instructions followed by the patient record.
pub fn build_system_prompt(ctx: &ReplyContext) -> String {
    format!(
        "You are role-playing {name}, a {age}-year-old patient in a clinical training \
         simulation. A doctor in training is taking your history. Answer in the first \
         person, in one to three plain sentences, as a patient would speak. Stay \
         consistent with the record below. Do not name a diagnosis, suggest treatment, \
         or mention that this is a simulation. The more critical your condition, the \
         shorter and more distressed your answers.\n\n{record}",
        name = ctx.patient.name,
        age = ctx.patient.age,
        record = build_patient_record(ctx),
    )
}

/// Conversation turns ending with the current question.
///
/// The model expects strictly alternating turns starting with the learner,
/// so leading patient lines are dropped and consecutive lines from the same
/// side are merged.
pub fn build_turns(ctx: &ReplyContext) -> Vec<PromptTurn> {
    let lines = ctx
        .history
        .iter()
        .map(|entry| (entry.role == ChatRole::Doctor, entry.text.as_str()))
        .chain(std::iter::once((true, ctx.question.as_str())))
        .skip_while(|(from_learner, _)| !from_learner);

    let mut turns: Vec<PromptTurn> = Vec::new();
    for (from_learner, text) in lines {
        match turns.last_mut() {
            Some(last) if last.from_learner == from_learner => {
                last.text.push('\n');
                last.text.push_str(text);
            }
            _ => turns.push(PromptTurn {
                from_learner,
                text: text.to_string(),
            }),
        }
    }
    turns
}
