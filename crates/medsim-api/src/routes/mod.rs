pub mod cases;
pub mod health;
pub mod leaderboard;
pub mod rooms;
pub mod sessions;
pub mod ws;
