//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;

use mediadesk_api::{AppState, build_router};
use mediadesk_core::config::AppConfig;
use mediadesk_core::types::UserId;

const BOUNDARY: &str = "mediadesk-test-boundary";

/// Test application backed by a temporary storage tree.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    _tmp: tempfile::TempDir,
}

/// Identity forwarded in the gateway headers.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: UserId,
    pub roles: Vec<String>,
}

impl TestUser {
    pub fn new(roles: &[&str]) -> Self {
        Self {
            id: UserId::new(),
            roles: roles.iter().map(|r| (*r).to_string()).collect(),
        }
    }

    pub fn admin() -> Self {
        Self::new(&["admin"])
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body, `Null` for non-JSON payloads
    pub body: Value,
    /// Raw body bytes
    pub raw: Bytes,
    /// Content-Type header, if any
    pub content_type: Option<String>,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    /// Create a new test application with fresh storage roots.
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = AppConfig::default();
        config.storage.public_dir = path_str(tmp.path().join("public"));
        config.storage.protected_dir = path_str(tmp.path().join("protected"));
        config.storage.upload_dir = path_str(tmp.path().join("staging"));

        let state = AppState::build(config.clone())
            .await
            .expect("Failed to build app state");

        Self {
            router: build_router(state),
            config,
            _tmp: tmp,
        }
    }

    /// Physical location of a logical path inside the public root.
    pub fn public_path(&self, logical: &str) -> PathBuf {
        PathBuf::from(&self.config.storage.public_dir).join(logical)
    }

    /// Physical location of a logical path inside the protected root.
    pub fn protected_path(&self, logical: &str) -> PathBuf {
        PathBuf::from(&self.config.storage.protected_dir).join(logical)
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<&TestUser>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = with_identity(Request::builder().method(method).uri(path), user)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload files as multipart form data, optionally into a directory.
    pub async fn upload(
        &self,
        directory: Option<&str>,
        files: &[(&str, &[u8])],
        user: Option<&TestUser>,
    ) -> TestResponse {
        self.multipart("POST", "/api/files/upload", directory, files, user)
            .await
    }

    /// Send a multipart request.
    pub async fn multipart(
        &self,
        method: &str,
        path: &str,
        directory: Option<&str>,
        files: &[(&str, &[u8])],
        user: Option<&TestUser>,
    ) -> TestResponse {
        let mut body = Vec::new();
        if let Some(dir) = directory {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"directory\"\r\n\r\n{dir}\r\n"
                )
                .as_bytes(),
            );
        }
        for (name, data) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = with_identity(Request::builder().method(method).uri(path), user)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Create a directory and return its `d:` key and id.
    pub async fn mkdir(&self, parent: Option<&str>, name: &str, user: &TestUser) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/api/directories",
                Some(serde_json::json!({ "parent_id": parent, "name": name })),
                Some(user),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        let key = response.data()["key"].as_str().expect("key").to_string();
        let id = key.trim_start_matches("d:").to_string();
        (key, id)
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let raw = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            raw,
            content_type,
        }
    }
}

fn with_identity(
    mut builder: axum::http::request::Builder,
    user: Option<&TestUser>,
) -> axum::http::request::Builder {
    if let Some(user) = user {
        builder = builder
            .header("x-user-id", user.id.to_string())
            .header("x-user-roles", user.roles.join(","));
    }
    builder
}

fn path_str(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

/// A solid-colour JPEG of the given dimensions.
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 90, 160]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .expect("Failed to encode jpeg");
    out.into_inner()
}
