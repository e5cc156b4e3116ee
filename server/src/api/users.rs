//! User Routes
//!
//! Registration, lookup by email and the browse lists shown to regular users.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use super::AppState;
use crate::db::{MenuItem, Outlet, Record, Roommate, StoredImage, User};
use crate::error::{ApiError, ApiResult};
use crate::forms::MultipartForm;
use crate::password::hash_password;
use crate::storage::AssetFolder;
use crate::validation::{validate_user, UserInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/get-user-by-email/{email}", get(get_user_by_email))
        .route("/roomies", get(list_roommates))
        .route("/menu", get(list_menu))
        .route("/outlets", get(list_outlets))
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Register a local or federated account.
///
/// The email is checked before any picture is fetched or uploaded. Federated
/// sign-ups import the identity provider's picture through the image store.
#[tracing::instrument(skip(state, multipart))]
async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let mut form = MultipartForm::from_multipart(multipart, state.config.max_upload_size).await?;
    let input = validate_user(&form, Utc::now())?;

    if state.repo.find_user_by_email(&input.email).await?.is_some() {
        return Err(ApiError::Duplicate("User already exists.".into()));
    }

    let picture = profile_picture(&state, &input, &mut form).await?;
    let password_hash = input.password.as_deref().map(hash_password).transpose()?;

    let user = state
        .repo
        .create_user(input.into_user(password_hash, picture))
        .await?;

    tracing::info!(
        user_id = %user.id,
        user_type = %user.body.user_type,
        federated = user.body.is_google_sign_up,
        "User registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Registration successful!",
        }),
    ))
}

/// Resolve the picture to store: the provider's picture for federated
/// sign-ups, the optional attached file otherwise.
async fn profile_picture(
    state: &AppState,
    input: &UserInput,
    form: &mut MultipartForm,
) -> ApiResult<Option<StoredImage>> {
    let data = match (&input.remote_picture, form.take_file("profilePicture")) {
        (Some(url), _) => state.fetcher.fetch(url).await?,
        (None, Some(file)) => file.data,
        (None, None) => return Ok(None),
    };

    let folder = AssetFolder::ProfilePictures.path(&state.config.asset_root);
    Ok(Some(state.images.upload(data, &folder).await?))
}

#[tracing::instrument(skip(state))]
async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Record<User>>> {
    let email = email.trim().to_lowercase();
    state
        .repo
        .find_user_by_email(&email)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

#[tracing::instrument(skip(state))]
async fn list_roommates(State(state): State<AppState>) -> ApiResult<Json<Vec<Record<Roommate>>>> {
    Ok(Json(state.repo.list_roommates().await?))
}

#[tracing::instrument(skip(state))]
async fn list_menu(State(state): State<AppState>) -> ApiResult<Json<Vec<Record<MenuItem>>>> {
    Ok(Json(state.repo.list_menu_items().await?))
}

/// All outlets; an empty list is reported as not found.
#[tracing::instrument(skip(state))]
async fn list_outlets(State(state): State<AppState>) -> ApiResult<Json<Vec<Record<Outlet>>>> {
    let outlets = state.repo.list_outlets().await?;
    if outlets.is_empty() {
        return Err(ApiError::NotFound("No outlets found.".into()));
    }
    Ok(Json(outlets))
}
