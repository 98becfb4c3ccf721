use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use jiff::Timestamp;
use serde::Deserialize;

use medsim_core::models::case::Difficulty;
use medsim_core::models::leaderboard::{LeaderboardEntry, LeaderboardMode, LeaderboardQuery};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    #[serde(default)]
    pub mode: Option<LeaderboardMode>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub since: Option<Timestamp>,
    #[serde(default)]
    pub until: Option<Timestamp>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl From<LeaderboardParams> for LeaderboardQuery {
    fn from(params: LeaderboardParams) -> Self {
        LeaderboardQuery {
            mode: params.mode.unwrap_or(LeaderboardMode::Solo),
            difficulty: params.difficulty,
            since: params.since,
            until: params.until,
            limit: params.limit,
        }
    }
}

pub async fn list_leaderboard(
    State(state): State<AppState>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = LeaderboardQuery::from(params);
    Ok(Json(state.leaderboard.list(&query).await))
}
