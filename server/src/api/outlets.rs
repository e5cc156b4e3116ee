//! Outlet handlers shared by the mess and residence routes.
//!
//! Both routes accept the same form; only the upload folder differs. The stored
//! outlet type always comes from [`OutletType::for_owner`].
//!
//! [`OutletType::for_owner`]: crate::db::OutletType::for_owner

use axum::{extract::Multipart, http::StatusCode, Json};

use super::{parse_id, AppState};
use crate::db::{Outlet, OutletSummary, Record};
use crate::error::{ApiError, ApiResult};
use crate::forms::MultipartForm;
use crate::storage::AssetFolder;
use crate::validation::validate_outlet;

/// Validate, upload the outlet image into `folder`, then persist.
pub(super) async fn create(
    state: &AppState,
    multipart: Multipart,
    folder: AssetFolder,
) -> ApiResult<(StatusCode, Json<Record<Outlet>>)> {
    let mut form = MultipartForm::from_multipart(multipart, state.config.max_upload_size).await?;
    let input = validate_outlet(&form)?;

    let file = form
        .take_file("image")
        .ok_or_else(|| ApiError::Internal("validated image missing".into()))?;
    let image = state
        .images
        .upload(file.data, &folder.path(&state.config.asset_root))
        .await?;

    let outlet = state.repo.create_outlet(input.into_outlet(image)).await?;

    tracing::info!(
        outlet_id = %outlet.id,
        outlet_type = %outlet.body.outlet_type,
        "Outlet created"
    );

    Ok((StatusCode::CREATED, Json(outlet)))
}

pub(super) async fn list(state: &AppState) -> ApiResult<Json<Vec<Record<Outlet>>>> {
    Ok(Json(state.repo.list_outlets().await?))
}

/// Public projection of one outlet.
pub(super) async fn summary(state: &AppState, raw_id: &str) -> ApiResult<Json<OutletSummary>> {
    let id = parse_id(raw_id)?;
    let outlet = state
        .repo
        .find_outlet(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Outlet not found.".into()))?;

    Ok(Json(outlet.into()))
}
