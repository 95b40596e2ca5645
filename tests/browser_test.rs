//! Integration tests for the browser listing and lazy tree.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, TestUser};

#[tokio::test]
async fn test_listing_orders_directories_first_and_hides_entries() {
    let app = TestApp::new().await;
    let admin = TestUser::admin();
    app.mkdir(None, "zeta", &admin).await;
    let (hidden, _) = app.mkdir(None, "hidden", &admin).await;
    let (vault, _) = app.mkdir(None, "vault", &admin).await;
    app.upload(None, &[("alpha.txt", &b"a"[..])], Some(&admin))
        .await;

    app.request(
        "PATCH",
        &format!("/api/entries/{hidden}"),
        Some(json!({ "invisible": true })),
        Some(&admin),
    )
    .await;
    app.request(
        "PATCH",
        &format!("/api/entries/{vault}"),
        Some(json!({ "protected": true })),
        Some(&admin),
    )
    .await;

    let response = app.request("GET", "/api/browser", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response.data()["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["zeta", "alpha.txt"]);
    assert_eq!(
        response.data()["entries"][1]["url"],
        "/public/media/alpha.txt"
    );

    let response = app.request("GET", "/api/browser", None, Some(&admin)).await;
    assert_eq!(response.data()["entries"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_listing_reports_parent_and_display_path() {
    let app = TestApp::new().await;
    let admin = TestUser::admin();
    let (_, media) = app.mkdir(None, "Media", &admin).await;
    let (_, year) = app.mkdir(Some(media.as_str()), "Year 2024", &admin).await;

    let response = app
        .request("GET", &format!("/api/browser?dir={year}"), None, Some(&admin))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["parent"], media.as_str());
    assert_eq!(response.data()["display_path"], "Media/Year 2024");
}

#[tokio::test]
async fn test_tree_marks_lazy_and_expands_requested_nodes() {
    let app = TestApp::new().await;
    let admin = TestUser::admin();
    let (_, media) = app.mkdir(None, "media", &admin).await;
    app.mkdir(Some(media.as_str()), "photos", &admin).await;
    app.mkdir(None, "empty", &admin).await;

    let collapsed = app
        .request("GET", "/api/browser/tree", None, Some(&admin))
        .await;
    assert_eq!(collapsed.status, StatusCode::OK);
    let nodes = collapsed.data().as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["title"], "empty");
    assert!(nodes[0].get("lazy").is_none());
    assert_eq!(nodes[1]["title"], "media");
    assert_eq!(nodes[1]["lazy"], true);

    let expanded = app
        .request(
            "GET",
            &format!("/api/browser/tree?expanded={media}"),
            None,
            Some(&admin),
        )
        .await;
    let media_node = &expanded.data()[1];
    assert_eq!(media_node["expanded"], true);
    assert_eq!(media_node["children"][0]["title"], "photos");
}

#[tokio::test]
async fn test_tree_rejects_file_parent() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "GET",
            &format!("/api/browser/tree?parent=f:{}", mediadesk_core::types::FileId::new()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
