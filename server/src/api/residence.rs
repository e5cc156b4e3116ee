//! Residence Routes
//!
//! Residency outlets, room listings and roommate profiles.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures::future::try_join_all;
use serde::Serialize;

use super::{outlets, parse_id, AppState};
use crate::db::{Outlet, OutletSummary, Record, Room, Roommate};
use crate::error::{ApiError, ApiResult};
use crate::forms::MultipartForm;
use crate::storage::AssetFolder;
use crate::validation::{validate_room, validate_roommate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add-outlet", post(add_outlet))
        .route("/outlet/{id}", get(get_outlet))
        .route("/outlets", get(list_outlets))
        .route("/register-room", post(register_room))
        .route("/rooms", get(list_rooms))
        .route("/room/{id}", get(get_room))
        .route("/add-roommate", post(add_roommate))
        .route("/roommate/{id}", get(get_roommate))
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RoomCreated {
    pub message: &'static str,
    pub room: Record<Room>,
}

#[derive(Debug, Serialize)]
pub struct RoommateCreated {
    pub message: &'static str,
    pub data: Record<Roommate>,
}

// ============================================================================
// Outlets
// ============================================================================

#[tracing::instrument(skip(state, multipart))]
async fn add_outlet(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Record<Outlet>>)> {
    outlets::create(&state, multipart, AssetFolder::ResidencyOutlets).await
}

#[tracing::instrument(skip(state))]
async fn get_outlet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OutletSummary>> {
    outlets::summary(&state, &id).await
}

#[tracing::instrument(skip(state))]
async fn list_outlets(State(state): State<AppState>) -> ApiResult<Json<Vec<Record<Outlet>>>> {
    outlets::list(&state).await
}

// ============================================================================
// Rooms
// ============================================================================

/// Register a room with one to four photos.
///
/// Every photo is uploaded concurrently; the room is only stored once all
/// uploads have succeeded.
#[tracing::instrument(skip(state, multipart))]
async fn register_room(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<RoomCreated>)> {
    let mut form = MultipartForm::from_multipart(multipart, state.config.max_upload_size).await?;
    let input = validate_room(&form, Utc::now())?;

    let folder = AssetFolder::Rooms.path(&state.config.asset_root);
    let uploads = form
        .take_files("images")
        .into_iter()
        .map(|file| state.images.upload(file.data, &folder));
    let images = try_join_all(uploads).await?;

    let room = state.repo.create_room(input.into_room(images)).await?;

    tracing::info!(room_id = %room.id, images = room.body.images.len(), "Room registered");

    Ok((
        StatusCode::CREATED,
        Json(RoomCreated {
            message: "Room registered successfully!",
            room,
        }),
    ))
}

#[tracing::instrument(skip(state))]
async fn list_rooms(State(state): State<AppState>) -> ApiResult<Json<Vec<Record<Room>>>> {
    Ok(Json(state.repo.list_rooms().await?))
}

#[tracing::instrument(skip(state))]
async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Record<Room>>> {
    let id = parse_id(&id)?;
    state
        .repo
        .find_room(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Room not found.".into()))
}

// ============================================================================
// Roommates
// ============================================================================

#[tracing::instrument(skip(state, multipart))]
async fn add_roommate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<RoommateCreated>)> {
    let mut form = MultipartForm::from_multipart(multipart, state.config.max_upload_size).await?;
    let input = validate_roommate(&form)?;

    let file = form
        .take_file("profilePicture")
        .ok_or_else(|| ApiError::Internal("validated profile picture missing".into()))?;
    let picture = state
        .images
        .upload(file.data, &AssetFolder::Roommates.path(&state.config.asset_root))
        .await?;

    let roommate = state
        .repo
        .create_roommate(input.into_roommate(picture))
        .await?;

    tracing::info!(roommate_id = %roommate.id, "Roommate added");

    Ok((
        StatusCode::CREATED,
        Json(RoommateCreated {
            message: "Roommate added successfully",
            data: roommate,
        }),
    ))
}

#[tracing::instrument(skip(state))]
async fn get_roommate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Record<Roommate>>> {
    let id = parse_id(&id)?;
    state
        .repo
        .find_roommate(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Roommate not found.".into()))
}
