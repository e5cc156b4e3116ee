//! HTTP Integration Tests for User Registration and Browse Lists
//!
//! Run with: `cargo test --test users_http_test -- --nocapture`

mod helpers;

use axum::http::StatusCode;
use helpers::{
    google_user_fields, google_user_with_picture, local_user_fields, outlet_fields, TestApp, PNG,
};
use rq_server::db::Repository;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_local_user() {
    let app = TestApp::new();

    let form = local_user_fields("Asha@Example.com").file("profilePicture", "me.png", PNG);
    let (status, json) = app.post_form("/api/v1/user/register", form).await;

    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Registration successful!");
    assert_eq!(app.images.folders(), ["space-venture/users/profile_picture"]);

    let (status, user) = app
        .get("/api/v1/user/get-user-by-email/asha@example.com")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "asha@example.com");
    assert_eq!(user["userType"], "User");
    assert_eq!(user["dob"], "2000-02-29");
    assert!(user["_id"].is_string());
    assert!(user["profilePicture"]["url"].is_string());
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());

    let stored = app
        .repo
        .find_user_by_email("asha@example.com")
        .await
        .unwrap()
        .unwrap();
    let hash = stored.body.password_hash.unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(!hash.contains("correct horse battery"));
}

#[tokio::test]
async fn test_register_without_picture_uploads_nothing() {
    let app = TestApp::new();

    let (status, _) = app
        .post_form("/api/v1/user/register", local_user_fields("plain@example.com"))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.images.call_count(), 0);
    let user = app
        .repo
        .find_user_by_email("plain@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.body.profile_picture.is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app
        .post_form("/api/v1/user/register", local_user_fields("dup@example.com"))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let second = local_user_fields("DUP@example.com").file("profilePicture", "me.png", PNG);
    let (status, json) = app.post_form("/api/v1/user/register", second).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "DUPLICATE_ENTITY");
    assert_eq!(app.images.call_count(), 0, "no upload for a duplicate email");

    let users = app.repo.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].body.name, "Asha Kulkarni");
}

#[tokio::test]
async fn test_register_validation_reports_every_field() {
    let app = TestApp::new();

    let form = helpers::Multipart::new().texts(&[
        ("name", "A"),
        ("email", "not-an-email"),
        ("phone", "123"),
        ("userType", "Admin"),
    ]);
    let (status, json) = app.post_form("/api/v1/user/register", form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "VALIDATION_ERROR");
    let fields: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    for field in ["name", "email", "password", "phone", "userType"] {
        assert!(fields.contains(&field), "missing {field} in {fields:?}");
    }
    assert_eq!(app.repo.record_count().await, 0);
}

// ============================================================================
// Federated Registration
// ============================================================================

#[tokio::test]
async fn test_google_sign_up_imports_provider_picture() {
    let app = TestApp::new();

    let (status, _) = app
        .post_form("/api/v1/user/register", google_user_fields("asha@gmail.com"))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.fetcher.call_count(), 1);
    assert_eq!(app.images.call_count(), 1);

    let user = app
        .repo
        .find_user_by_email("asha@gmail.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.body.is_google_sign_up);
    assert!(user.body.password_hash.is_none());
    assert!(user
        .body
        .profile_picture
        .unwrap()
        .public_id
        .starts_with("space-venture/users/profile_picture/"));
}

#[tokio::test]
async fn test_unreachable_picture_is_502_not_upload_failure() {
    let app = TestApp::new();
    app.fetcher.set_unreachable();

    let (status, json) = app
        .post_form("/api/v1/user/register", google_user_fields("fetch@gmail.com"))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "PROFILE_PICTURE_FETCH_FAILED");
    assert_eq!(app.images.call_count(), 0);
    assert_eq!(app.repo.record_count().await, 0);
}

#[tokio::test]
async fn test_private_picture_url_is_rejected_before_fetch() {
    let app = TestApp::new();

    for (email, url) in [
        ("meta@gmail.com", "http://169.254.169.254/latest/meta-data/iam"),
        ("loop@gmail.com", "http://127.0.0.1:5432/"),
        ("lan@gmail.com", "http://10.0.0.5/admin"),
        ("named@gmail.com", "http://localhost:8080/avatar.png"),
    ] {
        let form = google_user_with_picture(email, url);
        let (status, json) = app.post_form("/api/v1/user/register", form).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{url}");
        assert_eq!(json["error"], "VALIDATION_ERROR", "{url}");
        assert_eq!(json["details"][0]["field"], "profilePicture", "{url}");
    }

    assert_eq!(app.fetcher.call_count(), 0);
    assert_eq!(app.images.call_count(), 0);
    assert_eq!(app.repo.record_count().await, 0);
}

#[tokio::test]
async fn test_failing_upload_is_500() {
    let app = TestApp::new();
    app.images.fail_always();

    let (status, json) = app
        .post_form("/api/v1/user/register", google_user_fields("upload@gmail.com"))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "UPLOAD_FAILED");
    assert_eq!(app.repo.record_count().await, 0);
}

// ============================================================================
// Lookups and Lists
// ============================================================================

#[tokio::test]
async fn test_unknown_email_is_404() {
    let app = TestApp::new();

    let (status, json) = app
        .get("/api/v1/user/get-user-by-email/nobody@example.com")
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_user_outlets_is_404_when_empty() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/v1/user/outlets").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let form = outlet_fields("Multi-Mess Manager", "Mess").file("image", "front.png", PNG);
    let (status, _) = app.post_form("/api/v1/mess/add-mess", form).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = app.get("/api/v1/user/outlets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_lists_are_empty_arrays() {
    let app = TestApp::new();

    for uri in ["/api/v1/user/roomies", "/api/v1/user/menu"] {
        let (status, json) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json, serde_json::json!([]), "{uri}");
    }
}
