//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum
//! router backed by the in-memory repository and recording storage fakes, plus
//! a small multipart body builder.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Method, Request, Response, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use rq_server::api::{create_router, AppState};
use rq_server::config::Config;
use rq_server::db::memory::MemoryRepository;
use rq_server::test_support::{FakeFetcher, RecordingImageStore};
use tower::ServiceExt;

/// Small PNG signature followed by filler bytes.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDRfake";

/// Router plus handles on every fake it is wired to.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub images: Arc<RecordingImageStore>,
    pub fetcher: Arc<FakeFetcher>,
    pub config: Config,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default_for_test())
    }

    /// Create a test app with a custom config (for limit testing).
    pub fn with_config(config: Config) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let images = Arc::new(RecordingImageStore::new());
        let fetcher = Arc::new(FakeFetcher::new());

        let state = AppState::new(repo.clone(), images.clone(), fetcher.clone(), config.clone());

        Self {
            router: create_router(state),
            repo,
            images,
            fetcher,
            config,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Self::request(Method::GET, uri)
            .body(Body::empty())
            .unwrap();
        let resp = self.oneshot(req).await;
        let status = resp.status();
        (status, body_to_json(resp).await)
    }

    pub async fn post_form(&self, uri: &str, form: Multipart) -> (StatusCode, serde_json::Value) {
        let (content_type, body) = form.finish();
        let req = Self::request(Method::POST, uri)
            .header("Content-Type", content_type)
            .body(Body::from(body))
            .unwrap();
        let resp = self.oneshot(req).await;
        let status = resp.status();
        (status, body_to_json(resp).await)
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}

/// `multipart/form-data` body builder.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    const BOUNDARY: &'static str = "----RoomQuestTestBoundary";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                Self::BOUNDARY
            )
            .as_bytes(),
        );
        self
    }

    pub fn texts(self, pairs: &[(&str, &str)]) -> Self {
        pairs.iter().fold(self, |form, (k, v)| form.text(k, v))
    }

    pub fn file(mut self, name: &str, file_name: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n",
                Self::BOUNDARY
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Content-Type header value and the encoded body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", Self::BOUNDARY).as_bytes());
        (
            format!("multipart/form-data; boundary={}", Self::BOUNDARY),
            self.body,
        )
    }
}

// ============================================================================
// Valid payloads
// ============================================================================

pub fn outlet_fields(user_type: &str, outlet_type: &str) -> Multipart {
    Multipart::new().texts(&[
        ("outletName", "Annapurna Mess"),
        ("location", "Kothrud, Pune"),
        ("phone", "9876543210"),
        ("email", "owner@annapurna.in"),
        ("openingHours", "8am - 10pm"),
        ("coordinates[lat]", "18.5074"),
        ("coordinates[lng]", "73.8077"),
        ("description", "Home-style Maharashtrian thali"),
        ("userType", user_type),
        ("outletType", outlet_type),
    ])
}

/// A future date, formatted as `YYYY-MM-DD`.
pub fn future_date() -> String {
    (Utc::now() + Duration::days(30)).format("%Y-%m-%d").to_string()
}

pub fn room_fields(available_from: &str) -> Multipart {
    Multipart::new()
        .texts(&[
            ("price", "8500"),
            ("location", "Baner, Pune"),
            ("ownerName", "Sunil"),
            ("furnishing", "Semi Furnished"),
            ("accommodationType", "2BHK"),
            ("contactNumber", "9000000001"),
            ("roomDescription", "Airy room near the IT park"),
            ("facilities[]", "Wifi"),
            ("facilities[]", "Parking"),
            ("amenities", "Lift, power backup"),
            ("propertyAge", "4"),
        ])
        .text("availableFrom", available_from)
}

pub fn roommate_fields() -> Multipart {
    Multipart::new().texts(&[
        ("roommateName", "Kabir"),
        ("roommateAge", "23"),
        ("roommateGender", "Male"),
        ("roomType", "Shared"),
        ("furnishing", "Fully Furnished"),
        ("preferences[]", "Non-smoker"),
        ("roomDesc", "Looking for a calm flatmate"),
        ("price", "6000"),
        ("vacancy", "1"),
        ("address", "Viman Nagar, Pune"),
    ])
}

pub fn local_user_fields(email: &str) -> Multipart {
    Multipart::new().texts(&[
        ("name", "Asha Kulkarni"),
        ("email", email),
        ("password", "correct horse battery"),
        ("phone", "9876543210"),
        ("userType", "User"),
        ("address", "FC Road, Pune"),
        ("dob", "2000-02-29"),
        ("isGoogleSignUp", "false"),
    ])
}

pub fn google_user_fields(email: &str) -> Multipart {
    google_user_with_picture(email, "https://lh3.googleusercontent.com/a/asha")
}

pub fn google_user_with_picture(email: &str, picture_url: &str) -> Multipart {
    Multipart::new().texts(&[
        ("name", "Asha Kulkarni"),
        ("email", email),
        ("phone", "9876543210"),
        ("userType", "User"),
        ("isGoogleSignUp", "true"),
        ("profilePicture", picture_url),
    ])
}
