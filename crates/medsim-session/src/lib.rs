//! medsim-session
//!
//! In-memory session and room stores. Every mutation of one session or room
//! runs under that entry's lock; distinct entries never contend.

pub mod audit;
pub mod leaderboard;
pub mod rooms;
pub mod router;
pub mod sessions;
pub mod store;

pub use leaderboard::Leaderboard;
pub use rooms::RoomCoordinator;
pub use router::ConversationRouter;
pub use sessions::SessionStore;
pub use store::KeyedStore;
