use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medsim_core::models::case::PublicCase;
use medsim_core::models::report::Report;
use medsim_core::models::room::{Room, RoomStatus};
use medsim_core::models::turn::{AnswerReceipt, ChatReceipt};

use crate::error::ApiError;
use crate::routes::sessions::non_empty_question;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub case_id: String,
    pub capacity: usize,
    pub host_id: String,
}

#[derive(Debug, Serialize)]
pub struct RoomCreated {
    pub room_id: Uuid,
    pub case: PublicCase,
    pub status: RoomStatus,
    pub capacity: usize,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub player_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoomChatRequest {
    pub player_id: String,
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct RoomAnswerRequest {
    pub player_id: String,
    pub question_id: String,
    pub chosen_index: usize,
}

fn non_empty_player(player_id: &str) -> Result<&str, ApiError> {
    let player_id = player_id.trim();
    if player_id.is_empty() {
        return Err(ApiError::BadRequest("player_id must not be empty".to_string()));
    }
    Ok(player_id)
}

pub async fn create_room(
    State(state): State<AppState>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<Json<RoomCreated>, ApiError> {
    let Json(req) = payload?;
    let host_id = non_empty_player(&req.host_id)?;
    let room = state
        .rooms
        .create_room(&req.case_id, req.capacity, host_id)
        .await?;
    let case = state.catalog.get(&room.case_id)?;

    Ok(Json(RoomCreated {
        room_id: room.id,
        case: case.public_view(),
        status: room.status,
        capacity: room.capacity,
    }))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Room>, ApiError> {
    Ok(Json(state.rooms.get_room(id).await?))
}

pub async fn join_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<JoinRoomRequest>, JsonRejection>,
) -> Result<Json<Room>, ApiError> {
    let Json(req) = payload?;
    let player_id = non_empty_player(&req.player_id)?;
    let room = state
        .rooms
        .join_room(id, player_id, req.name.as_deref())
        .await?;
    Ok(Json(room))
}

pub async fn room_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RoomChatRequest>, JsonRejection>,
) -> Result<Json<ChatReceipt>, ApiError> {
    let Json(req) = payload?;
    let question = non_empty_question(&req.question)?;
    Ok(Json(state.rooms.room_chat(id, &req.player_id, question).await?))
}

pub async fn room_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RoomAnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerReceipt>, ApiError> {
    let Json(req) = payload?;
    let receipt = state
        .rooms
        .room_answer(id, &req.player_id, &req.question_id, req.chosen_index)
        .await?;
    Ok(Json(receipt))
}

pub async fn end_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.rooms.end_room(id).await?))
}
