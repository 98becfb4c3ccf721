use jiff::{SignedDuration, Timestamp};

use medsim_core::models::state::{PatientState, SimEvent};
use medsim_core::CaseCatalog;
use medsim_engine::scoring::accuracy;
use medsim_engine::{score, score_breakdown};

fn start() -> Timestamp {
    Timestamp::from_second(1_700_000_000).unwrap()
}

fn at(seconds: i64) -> Timestamp {
    start().checked_add(SignedDuration::from_secs(seconds)).unwrap()
}

fn state_with(correct: u32, wrong: u32) -> PatientState {
    let catalog = CaseCatalog::bundled().unwrap();
    let case = catalog.get("mi-001").unwrap();
    let mut state = PatientState::new(&case, start());
    let outcomes = std::iter::repeat_n(true, correct as usize)
        .chain(std::iter::repeat_n(false, wrong as usize));
    for (i, was_correct) in outcomes.enumerate() {
        state.events.push(SimEvent::McqAnswer {
            question_id: "q1".to_string(),
            chosen_index: 0,
            was_correct,
            timestamp: at(i as i64),
            player_id: None,
        });
    }
    state
}

#[test]
fn fresh_state_scores_time_and_survival_bonus() {
    let state = state_with(0, 0);
    let breakdown = score_breakdown(&state, start());
    assert_eq!(breakdown.base, 0);
    assert_eq!(breakdown.time_bonus, 200);
    assert_eq!(breakdown.outcome_bonus, 100);
    assert_eq!(breakdown.accuracy_bonus, 0);
    assert_eq!(breakdown.total, 300);
}

#[test]
fn all_components_add_up() {
    let state = state_with(4, 0);
    // 40 base + (200 - 10) time + 100 survival + 50 accuracy
    assert_eq!(score(&state, at(90)), 380);
}

#[test]
fn time_bonus_decays_per_whole_minute_and_floors_at_zero() {
    let state = state_with(0, 0);
    assert_eq!(score_breakdown(&state, at(59)).time_bonus, 200);
    assert_eq!(score_breakdown(&state, at(60)).time_bonus, 190);
    assert_eq!(score_breakdown(&state, at(19 * 60 + 59)).time_bonus, 10);
    assert_eq!(score_breakdown(&state, at(45 * 60)).time_bonus, 0);
}

#[test]
fn score_is_never_negative() {
    let mut state = state_with(0, 12);
    state.is_dead = true;
    assert_eq!(score(&state, at(60 * 60)), 0);
}

#[test]
fn more_wrong_answers_always_score_lower() {
    let scores: Vec<u32> = (0..5).map(|wrong| score(&state_with(4, wrong), at(60))).collect();
    for pair in scores.windows(2) {
        assert!(pair[0] > pair[1], "scores should strictly decrease: {scores:?}");
    }
}

#[test]
fn accuracy_bonus_threshold_is_eighty_percent() {
    assert_eq!(score_breakdown(&state_with(4, 1), at(0)).accuracy_bonus, 50);
    assert_eq!(score_breakdown(&state_with(3, 1), at(0)).accuracy_bonus, 0);
}

#[test]
fn accuracy_is_zero_without_answers() {
    assert_eq!(accuracy(0, 0), 0.0);
    assert_eq!(accuracy(3, 1), 75.0);
}

#[test]
fn finished_state_scores_identically_at_any_later_time() {
    let mut state = state_with(2, 1);
    state.ended_at = Some(at(150));
    let first = score(&state, at(200));
    let second = score(&state, at(5_000));
    assert_eq!(first, second);
    assert_eq!(first, score(&state, at(150)));
}

#[test]
fn death_removes_the_survival_bonus() {
    let alive = state_with(1, 2);
    let mut dead = alive.clone();
    dead.is_dead = true;
    assert_eq!(score(&alive, at(0)) - score(&dead, at(0)), 100);
}
