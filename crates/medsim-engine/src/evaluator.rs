use jiff::Timestamp;
use tracing::debug;

use medsim_core::error::SimError;
use medsim_core::models::case::Case;
use medsim_core::models::state::{PatientState, PatientStatus, SimEvent};

use crate::classifier::classify;
use crate::scoring::score;
use crate::vitals::apply_delta;

/// Result of applying one MCQ answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Answered {
        is_correct: bool,
        explanation: String,
        correct_index: usize,
        death_triggered: bool,
    },
    /// The patient was already dead; nothing was changed.
    Deceased,
}

/// Apply an answer to `state` in place.
///
/// The death threshold comes from `state.max_consecutive_wrong`, which was
/// resolved (with its default) when the state was created. Death is
/// terminal: once set, later answers return [`Evaluation::Deceased`] and
/// leave the state untouched.
pub fn evaluate_answer(
    state: &mut PatientState,
    case: &Case,
    question_id: &str,
    chosen_index: usize,
    player_id: Option<&str>,
    now: Timestamp,
) -> Result<Evaluation, SimError> {
    let question = case
        .question(question_id)
        .ok_or_else(|| SimError::QuestionNotFound {
            question_id: question_id.to_string(),
        })?;

    if state.is_dead {
        return Ok(Evaluation::Deceased);
    }

    let is_correct = chosen_index == question.correct_answer_index;
    let progression = &case.progression;
    let mut death_triggered = false;

    if is_correct {
        state.consecutive_wrong = 0;
        if let Some(delta) = &progression.on_correct_diagnosis {
            state.vitals = apply_delta(&state.vitals, delta);
        }
    } else {
        state.wrong_count += 1;
        state.consecutive_wrong += 1;
        if let Some(delta) = &progression.on_wrong_mcq {
            state.vitals = apply_delta(&state.vitals, delta);
        }
        if state.consecutive_wrong >= state.max_consecutive_wrong {
            state.is_dead = true;
            state.status = PatientStatus::Dead;
            death_triggered = true;
        }
    }

    state.events.push(SimEvent::McqAnswer {
        question_id: question_id.to_string(),
        chosen_index,
        was_correct: is_correct,
        timestamp: now,
        player_id: player_id.map(str::to_string),
    });

    if !state.is_dead {
        state.status = classify(&state.vitals);
    }
    state.score = score(state, now);

    debug!(
        case_id = %case.id,
        question_id,
        is_correct,
        consecutive_wrong = state.consecutive_wrong,
        status = ?state.status,
        "answer evaluated"
    );

    Ok(Evaluation::Answered {
        is_correct,
        explanation: question.explanation.clone(),
        correct_index: question.correct_answer_index,
        death_triggered,
    })
}
