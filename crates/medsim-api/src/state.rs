use std::sync::Arc;

use medsim_core::CaseCatalog;
use medsim_session::{ConversationRouter, Leaderboard, RoomCoordinator, SessionStore};

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CaseCatalog>,
    pub sessions: Arc<SessionStore>,
    pub rooms: Arc<RoomCoordinator>,
    pub leaderboard: Leaderboard,
}

impl AppState {
    pub fn new(catalog: Arc<CaseCatalog>, router: Arc<ConversationRouter>) -> Self {
        let sessions = Arc::new(SessionStore::new(Arc::clone(&catalog), Arc::clone(&router)));
        let rooms = Arc::new(RoomCoordinator::new(Arc::clone(&catalog), router));
        let leaderboard = Leaderboard::new(Arc::clone(&sessions), Arc::clone(&rooms));
        Self {
            catalog,
            sessions,
            rooms,
            leaderboard,
        }
    }
}
