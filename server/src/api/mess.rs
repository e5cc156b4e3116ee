//! Mess Routes
//!
//! Mess outlets and their menu items.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::{outlets, parse_id, AppState};
use crate::db::{MenuItem, Outlet, OutletSummary, Record};
use crate::error::{ApiError, ApiResult};
use crate::forms::MultipartForm;
use crate::storage::AssetFolder;
use crate::validation::validate_menu_item;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add-mess", post(add_mess))
        .route("/mess-outlet/{id}", get(get_mess))
        .route("/mess-outlets", get(list_messes))
        .route("/add-menu", post(add_menu))
        .route("/menu", get(list_menu))
        .route("/menu/{id}", get(get_menu_item))
}

#[derive(Debug, Serialize)]
pub struct MenuItemCreated {
    pub success: bool,
    pub message: &'static str,
    pub data: Record<MenuItem>,
}

#[tracing::instrument(skip(state, multipart))]
async fn add_mess(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Record<Outlet>>)> {
    outlets::create(&state, multipart, AssetFolder::MessOutlets).await
}

#[tracing::instrument(skip(state))]
async fn get_mess(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OutletSummary>> {
    outlets::summary(&state, &id).await
}

#[tracing::instrument(skip(state))]
async fn list_messes(State(state): State<AppState>) -> ApiResult<Json<Vec<Record<Outlet>>>> {
    outlets::list(&state).await
}

#[tracing::instrument(skip(state, multipart))]
async fn add_menu(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<MenuItemCreated>)> {
    let mut form = MultipartForm::from_multipart(multipart, state.config.max_upload_size).await?;
    let input = validate_menu_item(&form)?;

    let file = form
        .take_file("image")
        .ok_or_else(|| ApiError::Internal("validated image missing".into()))?;
    let image = state
        .images
        .upload(file.data, &AssetFolder::MenuItems.path(&state.config.asset_root))
        .await?;

    let item = state.repo.create_menu_item(input.into_menu_item(image)).await?;

    tracing::info!(menu_item_id = %item.id, outlet_id = %item.body.outlet_id, "Menu item added");

    Ok((
        StatusCode::CREATED,
        Json(MenuItemCreated {
            success: true,
            message: "Menu added successfully",
            data: item,
        }),
    ))
}

/// All menu items; an empty menu is reported as not found.
#[tracing::instrument(skip(state))]
async fn list_menu(State(state): State<AppState>) -> ApiResult<Json<Vec<Record<MenuItem>>>> {
    let items = state.repo.list_menu_items().await?;
    if items.is_empty() {
        return Err(ApiError::NotFound("No menu items found".into()));
    }
    Ok(Json(items))
}

#[tracing::instrument(skip(state))]
async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Record<MenuItem>>> {
    let id = parse_id(&id)?;
    state
        .repo
        .find_menu_item(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Menu item not found.".into()))
}
