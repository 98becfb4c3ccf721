use std::sync::Arc;

use medsim_core::models::leaderboard::{LeaderboardEntry, LeaderboardMode, LeaderboardQuery};
use medsim_engine::leaderboard::rank;

use crate::rooms::RoomCoordinator;
use crate::sessions::SessionStore;

/// Ranked view over completed sessions and rooms, built on every read.
#[derive(Clone)]
pub struct Leaderboard {
    sessions: Arc<SessionStore>,
    rooms: Arc<RoomCoordinator>,
}

impl Leaderboard {
    pub fn new(sessions: Arc<SessionStore>, rooms: Arc<RoomCoordinator>) -> Self {
        Self { sessions, rooms }
    }

    pub async fn list(&self, query: &LeaderboardQuery) -> Vec<LeaderboardEntry> {
        let entries = match query.mode {
            LeaderboardMode::Multiplayer => self.rooms.leaderboard_entries().await,
            LeaderboardMode::Solo | LeaderboardMode::Contest => {
                self.sessions.leaderboard_entries().await
            }
        };
        rank(entries, query)
    }
}
