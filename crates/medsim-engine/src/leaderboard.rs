//! Leaderboard projection and ranking.
//!
//! Entries are derived from completed sessions and rooms on every read;
//! nothing here is stored.

use std::cmp::Reverse;

use medsim_core::models::case::Case;
use medsim_core::models::leaderboard::{LeaderboardEntry, LeaderboardMode, LeaderboardQuery};
use medsim_core::models::report::Outcome;
use medsim_core::models::room::{Room, RoomStatus};
use medsim_core::models::session::Session;
use medsim_core::models::state::PatientState;

use crate::scoring::score;

fn project(
    state: &PatientState,
    case: &Case,
    player: String,
    mode: LeaderboardMode,
) -> Option<LeaderboardEntry> {
    let completed_at = state.ended_at?;
    Some(LeaderboardEntry {
        rank: 0,
        player,
        score: score(state, completed_at),
        elapsed_seconds: state.elapsed_seconds(completed_at),
        case_id: case.id.clone(),
        difficulty: case.difficulty,
        outcome: if state.is_dead {
            Outcome::Deceased
        } else {
            Outcome::Survived
        },
        mode,
        completed_at,
    })
}

/// Project a session; `None` until it has been ended.
pub fn session_entry(session: &Session, case: &Case) -> Option<LeaderboardEntry> {
    if !session.completed {
        return None;
    }
    project(
        &session.state,
        case,
        session.player_name.clone(),
        session.mode.into(),
    )
}

/// Project a room; `None` until it has been ended.
pub fn room_entry(room: &Room, case: &Case) -> Option<LeaderboardEntry> {
    if room.status != RoomStatus::Completed {
        return None;
    }
    project(
        &room.shared,
        case,
        room.team_name(),
        LeaderboardMode::Multiplayer,
    )
}

/// Filter, sort and rank.
///
/// Higher score first; equal scores go to the faster run, then to whoever
/// finished first.
pub fn rank(entries: Vec<LeaderboardEntry>, query: &LeaderboardQuery) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<LeaderboardEntry> = entries
        .into_iter()
        .filter(|e| e.mode == query.mode)
        .filter(|e| query.difficulty.is_none_or(|d| e.difficulty == d))
        .filter(|e| query.since.is_none_or(|since| e.completed_at >= since))
        .filter(|e| query.until.is_none_or(|until| e.completed_at <= until))
        .collect();

    ranked.sort_by_key(|e| (Reverse(e.score), e.elapsed_seconds, e.completed_at));
    ranked.truncate(query.effective_limit());

    for (index, entry) in ranked.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    ranked
}
