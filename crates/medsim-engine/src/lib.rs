//! medsim-engine
//!
//! Deterministic simulation rules. Pure functions over `medsim-core`
//! types: no locking, no clock reads, no I/O. Callers pass `now`.

pub mod classifier;
pub mod evaluator;
pub mod leaderboard;
pub mod report;
pub mod scoring;
pub mod vitals;

pub use classifier::classify;
pub use evaluator::{evaluate_answer, Evaluation};
pub use report::generate_report;
pub use scoring::{score, score_breakdown, ScoreBreakdown};
pub use vitals::apply_delta;
