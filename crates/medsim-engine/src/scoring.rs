use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use medsim_core::models::state::PatientState;

const POINTS_PER_CORRECT: i64 = 10;
const PENALTY_PER_WRONG: i64 = 5;
const MAX_TIME_BONUS: i64 = 200;
const TIME_BONUS_DECAY_PER_MINUTE: i64 = 10;
const SURVIVAL_BONUS: i64 = 100;
const ACCURACY_BONUS: i64 = 50;
const ACCURACY_BONUS_THRESHOLD: f64 = 80.0;

/// Every component of a score, for debriefs and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub correct: u32,
    pub wrong: u32,
    pub base: i64,
    pub time_bonus: i64,
    pub outcome_bonus: i64,
    pub accuracy_bonus: i64,
    pub accuracy: f64,
    pub total: u32,
}

/// Percentage of correct answers; 0 when nothing has been answered.
pub fn accuracy(correct: u32, wrong: u32) -> f64 {
    let total = correct + wrong;
    if total == 0 {
        0.0
    } else {
        100.0 * f64::from(correct) / f64::from(total)
    }
}

pub fn score_breakdown(state: &PatientState, now: Timestamp) -> ScoreBreakdown {
    let (correct, wrong) = state.answer_counts();
    let base = POINTS_PER_CORRECT * i64::from(correct) - PENALTY_PER_WRONG * i64::from(wrong);

    let elapsed_minutes = state.elapsed_seconds(now) / 60;
    let time_bonus = (MAX_TIME_BONUS - TIME_BONUS_DECAY_PER_MINUTE * elapsed_minutes).max(0);

    let outcome_bonus = if state.is_dead { 0 } else { SURVIVAL_BONUS };

    let accuracy = accuracy(correct, wrong);
    let accuracy_bonus = if accuracy >= ACCURACY_BONUS_THRESHOLD {
        ACCURACY_BONUS
    } else {
        0
    };

    let raw = base + time_bonus + outcome_bonus + accuracy_bonus;
    let total = u32::try_from(raw.max(0)).unwrap_or(u32::MAX);

    ScoreBreakdown {
        correct,
        wrong,
        base,
        time_bonus,
        outcome_bonus,
        accuracy_bonus,
        accuracy,
        total,
    }
}

/// Total score, floored at zero. Uses the end time once the run is over,
/// so repeated calls on a finished state always agree.
pub fn score(state: &PatientState, now: Timestamp) -> u32 {
    score_breakdown(state, now).total
}
