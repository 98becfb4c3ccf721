use axum::extract::{Path, State};
use axum::Json;

use medsim_core::models::case::{CaseSummary, PublicCase};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_cases(State(state): State<AppState>) -> Json<Vec<CaseSummary>> {
    Json(state.catalog.summaries())
}

pub async fn get_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicCase>, ApiError> {
    let case = state.catalog.get(&id)?;
    Ok(Json(case.public_view()))
}
