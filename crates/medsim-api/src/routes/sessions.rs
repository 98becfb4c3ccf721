use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medsim_core::models::case::PublicCase;
use medsim_core::models::report::Report;
use medsim_core::models::session::{Session, SessionMode};
use medsim_core::models::state::PatientStatus;
use medsim_core::models::turn::{AnswerReceipt, ChatReceipt};
use medsim_core::models::vitals::VitalSet;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub case_id: String,
    #[serde(default = "default_mode")]
    pub mode: SessionMode,
    #[serde(default)]
    pub player_name: Option<String>,
}

fn default_mode() -> SessionMode {
    SessionMode::Solo
}

#[derive(Debug, Serialize)]
pub struct SessionStarted {
    pub session_id: Uuid,
    pub case: PublicCase,
    pub vitals: VitalSet,
    pub status: PatientStatus,
    pub score: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: String,
    pub chosen_index: usize,
}

pub(crate) fn non_empty_question(question: &str) -> Result<&str, ApiError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }
    Ok(question)
}

pub async fn start_session(
    State(state): State<AppState>,
    payload: Result<Json<StartSessionRequest>, JsonRejection>,
) -> Result<Json<SessionStarted>, ApiError> {
    let Json(req) = payload?;
    let session = state
        .sessions
        .start_session(&req.case_id, req.mode, req.player_name.as_deref())
        .await?;
    let case = state.catalog.get(&session.case_id)?;

    Ok(Json(SessionStarted {
        session_id: session.id,
        case: case.public_view(),
        vitals: session.state.vitals,
        status: session.state.status,
        score: session.state.score,
    }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.sessions.get_session(id).await?))
}

pub async fn submit_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReceipt>, ApiError> {
    let Json(req) = payload?;
    let question = non_empty_question(&req.question)?;
    Ok(Json(state.sessions.submit_chat(id, question).await?))
}

pub async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerReceipt>, ApiError> {
    let Json(req) = payload?;
    let receipt = state
        .sessions
        .submit_answer(id, &req.question_id, req.chosen_index)
        .await?;
    Ok(Json(receipt))
}

pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.sessions.end_session(id).await?))
}
