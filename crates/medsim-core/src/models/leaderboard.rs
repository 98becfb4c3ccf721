use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::case::Difficulty;
use super::report::Outcome;
use super::session::SessionMode;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardMode {
    Solo,
    Contest,
    Multiplayer,
}

impl From<SessionMode> for LeaderboardMode {
    fn from(mode: SessionMode) -> Self {
        match mode {
            SessionMode::Solo => LeaderboardMode::Solo,
            SessionMode::Contest => LeaderboardMode::Contest,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub mode: LeaderboardMode,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Only runs that ended at or after this instant.
    #[serde(default)]
    pub since: Option<Timestamp>,
    /// Only runs that ended at or before this instant.
    #[serde(default)]
    pub until: Option<Timestamp>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LeaderboardQuery {
    pub fn new(mode: LeaderboardMode) -> Self {
        Self {
            mode,
            difficulty: None,
            since: None,
            until: None,
            limit: None,
        }
    }

    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .min(MAX_LEADERBOARD_LIMIT)
    }
}

/// Projection of a completed session or room. Derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position after sorting; 0 until ranked.
    pub rank: usize,
    pub player: String,
    pub score: u32,
    pub elapsed_seconds: i64,
    pub case_id: String,
    pub difficulty: Difficulty,
    pub outcome: Outcome,
    pub mode: LeaderboardMode,
    pub completed_at: Timestamp,
}
