pub mod case;
pub mod delta;
pub mod leaderboard;
pub mod report;
pub mod room;
pub mod session;
pub mod state;
pub mod turn;
pub mod vitals;
