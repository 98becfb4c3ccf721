//! End-of-session debrief.

use jiff::Timestamp;

use medsim_core::models::case::{Case, Difficulty};
use medsim_core::models::report::{ElapsedTime, MissedOpportunity, Outcome, Report};
use medsim_core::models::state::{PatientState, PatientStatus, SimEvent};

use crate::scoring::score_breakdown;

const MISSING_QUESTION_TEXT: &str = "(question no longer available)";
const MISSING_EXPLANATION_TEXT: &str = "No explanation is available for this question.";

const FAST_SECONDS: i64 = 300;
const SLOW_SECONDS: i64 = 900;

/// Build the report for a finished run.
///
/// Elapsed time and score use `state.ended_at` when set, so calling this
/// again on a completed state yields the same report.
pub fn generate_report(state: &PatientState, case: &Case, now: Timestamp) -> Report {
    let breakdown = score_breakdown(state, now);
    let elapsed_seconds = state.elapsed_seconds(now);
    let accuracy = round2(breakdown.accuracy);
    let outcome = if state.is_dead {
        Outcome::Deceased
    } else {
        Outcome::Survived
    };

    let missed_opportunities = state
        .events
        .iter()
        .filter_map(|event| match event {
            SimEvent::McqAnswer {
                question_id,
                chosen_index,
                was_correct: false,
                ..
            } => Some(missed_opportunity(case, question_id, *chosen_index)),
            SimEvent::McqAnswer { .. } => None,
        })
        .collect();

    let total_answers = breakdown.correct + breakdown.wrong;

    Report {
        case_id: case.id.clone(),
        difficulty: case.difficulty,
        patient_name: case.patient.name.clone(),
        elapsed: ElapsedTime::from_seconds(elapsed_seconds),
        score: breakdown.total,
        accuracy,
        correct_answers: breakdown.correct,
        wrong_answers: breakdown.wrong,
        total_answers,
        outcome,
        final_status: state.status,
        final_vitals: state.vitals.clone(),
        missed_opportunities,
        feedback: feedback(accuracy, elapsed_seconds, outcome),
        summary: summary(
            case,
            elapsed_seconds,
            breakdown.correct,
            total_answers,
            accuracy,
            state.status,
            outcome,
        ),
    }
}

fn missed_opportunity(case: &Case, question_id: &str, chosen_index: usize) -> MissedOpportunity {
    match case.question(question_id) {
        Some(q) => MissedOpportunity {
            question_id: question_id.to_string(),
            question: q.question.clone(),
            chosen_index,
            correct_index: Some(q.correct_answer_index),
            explanation: q.explanation.clone(),
        },
        None => MissedOpportunity {
            question_id: question_id.to_string(),
            question: MISSING_QUESTION_TEXT.to_string(),
            chosen_index,
            correct_index: None,
            explanation: MISSING_EXPLANATION_TEXT.to_string(),
        },
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Qualitative feedback, one line per band: accuracy, pace, outcome.
pub fn feedback(accuracy: f64, elapsed_seconds: i64, outcome: Outcome) -> Vec<String> {
    let accuracy_line = if accuracy >= 80.0 {
        "Excellent diagnostic accuracy."
    } else if accuracy >= 50.0 {
        "Solid reasoning, but review the questions you missed."
    } else {
        "Diagnostic accuracy needs significant improvement."
    };

    let pace_line = if elapsed_seconds < FAST_SECONDS {
        "Efficient case management."
    } else if elapsed_seconds <= SLOW_SECONDS {
        "Reasonable pace; aim to reach decisions sooner."
    } else {
        "Work on reaching decisions faster."
    };

    let outcome_line = match outcome {
        Outcome::Deceased => "The patient died. Revisit escalation criteria and early warning signs.",
        Outcome::Survived => "The patient survived under your care.",
    };

    vec![
        accuracy_line.to_string(),
        pace_line.to_string(),
        outcome_line.to_string(),
    ]
}

fn summary(
    case: &Case,
    elapsed_seconds: i64,
    correct: u32,
    total: u32,
    accuracy: f64,
    status: PatientStatus,
    outcome: Outcome,
) -> Vec<String> {
    let elapsed = ElapsedTime::from_seconds(elapsed_seconds);
    let outcome_line = match outcome {
        Outcome::Deceased => "Outcome: patient deceased.".to_string(),
        Outcome::Survived => format!(
            "Outcome: patient survived in {} condition.",
            status_label(status)
        ),
    };

    vec![
        format!(
            "Case {} ({}) managed in {}m {}s.",
            case.id,
            difficulty_label(case.difficulty),
            elapsed.minutes,
            elapsed.seconds
        ),
        format!("Answered {correct} of {total} questions correctly ({accuracy:.2}%)."),
        outcome_line,
    ]
}

fn status_label(status: PatientStatus) -> &'static str {
    match status {
        PatientStatus::Stable => "stable",
        PatientStatus::Deteriorating => "deteriorating",
        PatientStatus::Critical => "critical",
        PatientStatus::Dead => "dead",
    }
}

fn difficulty_label(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Critical => "critical",
        Difficulty::Severe => "severe",
    }
}
