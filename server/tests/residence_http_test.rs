//! HTTP Integration Tests for Residence Routes
//!
//! Outlets, room listings with multiple photos, and roommate profiles.
//!
//! Run with: `cargo test --test residence_http_test -- --nocapture`

mod helpers;

use axum::http::StatusCode;
use helpers::{future_date, outlet_fields, room_fields, roommate_fields, TestApp, PNG};
use rq_server::db::{DocumentId, Repository};

// ============================================================================
// Outlets
// ============================================================================

#[tokio::test]
async fn test_add_outlet_derives_residence_type() {
    let app = TestApp::new();

    let form = outlet_fields("Residency Owner", "Residence").file("image", "front.png", PNG);
    let (status, json) = app.post_form("/api/v1/residence/add-outlet", form).await;

    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["outletType"], "Residence");
    assert_eq!(json["userType"], "Residency Owner");
    assert_eq!(json["coordinates"]["lat"], 18.5074);
    assert!(json["_id"].is_string());
    assert!(json["createdAt"].is_string());
    assert!(json["image"]["public_id"]
        .as_str()
        .unwrap()
        .starts_with("space-venture/residency/outlets/"));
}

#[tokio::test]
async fn test_outlet_type_mismatch_is_rejected_without_upload() {
    let app = TestApp::new();

    let form = outlet_fields("Residency Owner", "Mess").file("image", "front.png", PNG);
    let (status, json) = app.post_form("/api/v1/residence/add-outlet", form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"][0]["field"], "outletType");
    assert_eq!(app.images.call_count(), 0);
    assert_eq!(app.repo.record_count().await, 0);
}

#[tokio::test]
async fn test_outlet_by_id_returns_public_fields_only() {
    let app = TestApp::new();

    let form = outlet_fields("Residency Owner", "Residence").file("image", "front.png", PNG);
    let (_, created) = app.post_form("/api/v1/residence/add-outlet", form).await;
    let id = created["_id"].as_str().unwrap();

    let (status, json) = app.get(&format!("/api/v1/residence/outlet/{id}")).await;

    assert_eq!(status, StatusCode::OK);
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        [
            "_id",
            "coordinates",
            "email",
            "image",
            "location",
            "openingHours",
            "outletName",
            "phone"
        ]
    );
}

#[tokio::test]
async fn test_malformed_id_is_rejected_before_lookup() {
    let app = TestApp::new();

    for uri in [
        "/api/v1/residence/outlet/abc",
        "/api/v1/residence/room/abc",
        "/api/v1/residence/roommate/507f1f77bcf86cd799439011",
    ] {
        let (status, json) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["error"], "INVALID_IDENTIFIER", "{uri}");
    }
    assert_eq!(app.repo.lookup_count(), 0);
}

#[tokio::test]
async fn test_absent_id_is_404() {
    let app = TestApp::new();
    let id = DocumentId::generate();

    let (status, json) = app.get(&format!("/api/v1/residence/outlet/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "NOT_FOUND");

    let (status, _) = app.get(&format!("/api/v1/residence/room/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.repo.lookup_count(), 2);
}

// ============================================================================
// Rooms
// ============================================================================

#[tokio::test]
async fn test_register_room_stores_one_image_per_file() {
    let app = TestApp::new();

    let form = room_fields(&future_date())
        .file("images", "a.png", PNG)
        .file("images", "b.png", PNG)
        .file("images", "c.png", PNG);
    let (status, json) = app.post_form("/api/v1/residence/register-room", form).await;

    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["message"], "Room registered successfully!");
    assert_eq!(json["room"]["images"].as_array().unwrap().len(), 3);
    assert_eq!(json["room"]["facilities"], serde_json::json!(["Wifi", "Parking"]));
    assert_eq!(json["room"]["accommodationType"], "2BHK");
    assert_eq!(app.images.call_count(), 3);

    let id = json["room"]["_id"].as_str().unwrap();
    let (status, room) = app.get(&format!("/api/v1/residence/room/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["images"], json["room"]["images"]);

    let (_, rooms) = app.get("/api/v1/residence/rooms").await;
    assert_eq!(rooms.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_room_without_images_stores_nothing() {
    let app = TestApp::new();

    let (status, json) = app
        .post_form("/api/v1/residence/register-room", room_fields(&future_date()))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"][0]["field"], "images");
    assert_eq!(app.images.call_count(), 0);
    assert_eq!(app.repo.record_count().await, 0);
}

#[tokio::test]
async fn test_register_room_with_five_images_is_rejected() {
    let app = TestApp::new();

    let form = (0..5).fold(room_fields(&future_date()), |form, i| {
        form.file("images", &format!("{i}.png"), PNG)
    });
    let (status, json) = app.post_form("/api/v1/residence/register-room", form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["details"][0]["message"],
        "You can upload a maximum of 4 images."
    );
    assert_eq!(app.images.call_count(), 0);
}

#[tokio::test]
async fn test_room_validation_is_exhaustive() {
    let app = TestApp::new();

    let form = helpers::Multipart::new()
        .texts(&[
            ("location", "Baner, Pune"),
            ("ownerName", "Sunil"),
            ("furnishing", "Semi Furnished"),
            ("accommodationType", "2BHK"),
            ("contactNumber", "9000000001"),
            ("roomDescription", "Airy room near the IT park"),
            ("amenities", "Lift, power backup"),
            ("propertyAge", "4"),
            ("availableFrom", "2001-01-01"),
        ])
        .file("images", "a.png", PNG);
    let (status, json) = app.post_form("/api/v1/residence/register-room", form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = json["details"].as_array().unwrap();
    assert_eq!(details.len(), 2, "{json}");
    assert_eq!(details[0]["field"], "price");
    assert_eq!(details[1]["field"], "availableFrom");
    assert_eq!(app.images.call_count(), 0);
}

#[tokio::test]
async fn test_failing_room_upload_stores_nothing() {
    let app = TestApp::new();
    app.images.fail_from_call(2);

    let form = room_fields(&future_date())
        .file("images", "a.png", PNG)
        .file("images", "b.png", PNG);
    let (status, json) = app.post_form("/api/v1/residence/register-room", form).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "UPLOAD_FAILED");
    assert_eq!(app.repo.list_rooms().await.unwrap().len(), 0);
}

// ============================================================================
// Roommates
// ============================================================================

#[tokio::test]
async fn test_add_roommate() {
    let app = TestApp::new();

    let form = roommate_fields()
        .text("facilities[]", "Wifi")
        .file("profilePicture", "kabir.png", PNG);
    let (status, json) = app.post_form("/api/v1/residence/add-roommate", form).await;

    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["message"], "Roommate added successfully");
    assert_eq!(json["data"]["roommateAge"], 23);
    assert_eq!(json["data"]["facilities"], serde_json::json!(["Wifi"]));
    assert_eq!(app.images.folders(), ["space-venture/residency/roommies"]);

    let id = json["data"]["_id"].as_str().unwrap();
    let (status, _) = app.get(&format!("/api/v1/residence/roommate/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, roomies) = app.get("/api/v1/user/roomies").await;
    assert_eq!(roomies.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_roommate_missing_facilities_never_uploads() {
    let app = TestApp::new();

    let form = roommate_fields().file("profilePicture", "kabir.png", PNG);
    let (status, json) = app.post_form("/api/v1/residence/add-roommate", form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"][0]["field"], "facilities");
    assert_eq!(app.images.call_count(), 0);
    assert_eq!(app.repo.record_count().await, 0);
}

#[tokio::test]
async fn test_roommate_missing_picture_is_validation_error() {
    let app = TestApp::new();

    let form = roommate_fields().text("facilities", "Wifi");
    let (status, json) = app.post_form("/api/v1/residence/add-roommate", form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"][0]["field"], "profilePicture");
}
