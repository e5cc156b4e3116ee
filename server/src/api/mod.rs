//! API Router and Application State
//!
//! Central routing configuration and shared state.

mod mess;
mod outlets;
mod residence;
mod users;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::db::{DocumentId, Repository};
use crate::error::ApiError;
use crate::storage::{ImageStore, RemoteImageFetcher};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Entity persistence
    pub repo: Arc<dyn Repository>,
    /// Object storage for uploaded images
    pub images: Arc<dyn ImageStore>,
    /// Downloader for federated profile pictures
    pub fetcher: Arc<dyn RemoteImageFetcher>,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        repo: Arc<dyn Repository>,
        images: Arc<dyn ImageStore>,
        fetcher: Arc<dyn RemoteImageFetcher>,
        config: Config,
    ) -> Self {
        Self {
            repo,
            images,
            fetcher,
            config: Arc::new(config),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = [state.config.frontend_url.as_str(), "http://localhost:5173"]
        .into_iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let api_routes = Router::new()
        .nest("/user", users::router())
        .nest("/residence", residence::router())
        .nest("/mess", mess::router());

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout(),
        ))
        .layer(cors)
        // Room listings carry up to four photos in one body
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Parse a path identifier before it reaches the repository.
fn parse_id(raw: &str) -> Result<DocumentId, ApiError> {
    Ok(DocumentId::parse(raw)?)
}
