//! Integration tests for public media delivery and the image cache.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, TestUser};

const VARIANT_URL: &str = "/public/media/_cache/200x%3F/default/jpg/images/a.jpg";

async fn seed_image(app: &TestApp, admin: &TestUser) -> String {
    let (_, images) = app.mkdir(None, "images", admin).await;
    let response = app
        .upload(
            Some(images.as_str()),
            &[("a.jpg", &helpers::jpeg(400, 200)[..])],
            Some(admin),
        )
        .await;
    assert_eq!(response.data()["uploaded"][0]["path"], "images/a.jpg");
    response.data()["uploaded"][0]["file_id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_raw_file_is_served_inline() {
    let app = TestApp::new().await;
    app.upload(None, &[("notes.txt", &b"hello"[..])], Some(&TestUser::admin()))
        .await;

    let response = app.request("GET", "/public/media/notes.txt", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("text/plain"));
    assert_eq!(&response.raw[..], b"hello");
}

#[tokio::test]
async fn test_variant_is_generated_then_cached() {
    let app = TestApp::new().await;
    let admin = TestUser::admin();
    seed_image(&app, &admin).await;
    let artifact = app.public_path("_cache/200x?/default/jpg/images/a.jpg");

    let first = app.request("GET", VARIANT_URL, None, None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.content_type.as_deref(), Some("image/jpeg"));
    assert!(artifact.is_file());
    let decoded = image::load_from_memory(&first.raw).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 100));

    let modified = std::fs::metadata(&artifact).unwrap().modified().unwrap();
    let second = app.request("GET", VARIANT_URL, None, None).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.raw, second.raw);
    assert_eq!(
        std::fs::metadata(&artifact).unwrap().modified().unwrap(),
        modified
    );
}

#[tokio::test]
async fn test_query_parameters_select_a_variant() {
    let app = TestApp::new().await;
    let admin = TestUser::admin();
    seed_image(&app, &admin).await;

    let response = app
        .request(
            "GET",
            "/public/media/images/a.jpg?size=100x%3F&type=png",
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("image/png"));
    assert!(
        app.public_path("_cache/100x?/default/png/images/a.jpg")
            .is_file()
    );
}

#[tokio::test]
async fn test_delete_purges_cached_variants() {
    let app = TestApp::new().await;
    let admin = TestUser::admin();
    let file_id = seed_image(&app, &admin).await;
    app.request("GET", VARIANT_URL, None, None).await;
    let artifact = app.public_path("_cache/200x?/default/jpg/images/a.jpg");
    assert!(artifact.is_file());

    let response = app
        .request("DELETE", &format!("/api/entries/f:{file_id}"), None, Some(&admin))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(!artifact.exists());
    assert!(!app.public_path("images/a.jpg").exists());
}

#[tokio::test]
async fn test_rename_invalidates_cached_variants() {
    let app = TestApp::new().await;
    let admin = TestUser::admin();
    let file_id = seed_image(&app, &admin).await;
    let first = app.request("GET", VARIANT_URL, None, None).await;
    assert_eq!(first.status, StatusCode::OK);

    let response = app
        .request(
            "PATCH",
            &format!("/api/entries/f:{file_id}"),
            Some(json!({ "name": "b.jpg" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["path"], "images/b.jpg");
    assert!(
        !app.public_path("_cache/200x?/default/jpg/images/a.jpg")
            .exists()
    );

    let parent = response.data()["parent_id"].as_str().unwrap().to_string();
    let upload = app
        .upload(
            Some(parent.as_str()),
            &[("a.jpg", &helpers::jpeg(400, 400)[..])],
            Some(&admin),
        )
        .await;
    assert_eq!(upload.data()["uploaded"][0]["path"], "images/a.jpg");

    let second = app.request("GET", VARIANT_URL, None, None).await;
    assert_eq!(second.status, StatusCode::OK);
    let decoded = image::load_from_memory(&second.raw).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 200));
}

#[tokio::test]
async fn test_oversized_variant_is_rejected() {
    let app = TestApp::new().await;
    seed_image(&app, &TestUser::admin()).await;

    let response = app
        .request(
            "GET",
            "/public/media/_cache/60000x60000/stretch/png/images/a.jpg",
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!app.public_path("_cache/60000x60000").exists());
}

#[tokio::test]
async fn test_protected_media_requires_grant() {
    let app = TestApp::new().await;
    let admin = TestUser::admin();
    let file_id = seed_image(&app, &admin).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/entries/f:{file_id}"),
            Some(json!({ "protected": true, "read_grants": ["editors"] })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let anonymous = app.request("GET", VARIANT_URL, None, None).await;
    assert_eq!(anonymous.status, StatusCode::FORBIDDEN);

    let outsider = TestUser::new(&["viewers"]);
    let denied = app
        .request("GET", "/public/media/images/a.jpg", None, Some(&outsider))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let editor = TestUser::new(&["editors"]);
    let allowed = app
        .request("GET", "/public/media/images/a.jpg", None, Some(&editor))
        .await;
    assert_eq!(allowed.status, StatusCode::OK);
}

#[tokio::test]
async fn test_media_errors() {
    let app = TestApp::new().await;
    app.upload(None, &[("doc.pdf", &b"%PDF"[..])], Some(&TestUser::admin()))
        .await;

    let missing = app.request("GET", "/public/media/nope.txt", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let not_an_image = app
        .request("GET", "/public/media/doc.pdf?size=100x100", None, None)
        .await;
    assert_eq!(not_an_image.status, StatusCode::BAD_REQUEST);

    let bad_size = app
        .request(
            "GET",
            "/public/media/_cache/huge/default/jpg/doc.jpg",
            None,
            None,
        )
        .await;
    assert_eq!(bad_size.status, StatusCode::BAD_REQUEST);
}
