//! Integration tests driving the full router against a temporary upload
//! directory and SQLite file.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sharebox_api::{AppState, create_router};
use sharebox_core::share::ShareService;
use sharebox_core::storage::{BlobStore, StorageConfig};
use sharebox_db::FileRepository;
use sharebox_notify::{TelegramConfig, TelegramNotifier};
use tempfile::TempDir;
use tower::ServiceExt;

const BASE_URL: &str = "http://localhost:8080";
const BOUNDARY: &str = "----shareboxtestboundary";

/// Build the router over fresh storage. The notifier has no credentials.
async fn test_app(max_file_size: u64) -> (TempDir, Router) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let upload_dir = dir.path().join("uploads");
    let db_path = dir.path().join("data.db");

    let storage = Arc::new(
        BlobStore::from_config(StorageConfig::new(&upload_dir).with_max_file_size(max_file_size))
            .expect("Failed to create blob store"),
    );
    let db = sharebox_db::connect(db_path.to_str().expect("utf-8 path"))
        .await
        .expect("Failed to open database");
    let notifier = TelegramNotifier::new(
        TelegramConfig::new("", "", BASE_URL),
        Arc::clone(&storage),
    )
    .expect("Failed to build notifier");

    let share = ShareService::new(
        storage,
        Arc::new(FileRepository::new(db)),
        Arc::new(notifier),
        BASE_URL,
    );

    let state = AppState {
        share: Arc::new(share),
        upload_dir,
    };
    (dir, create_router(state))
}

/// Multipart body with an optional file part and an optional description.
fn multipart_body(file: Option<(&str, &str, &[u8])>, description: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(desc) = description {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\n{desc}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn text_request(json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/text")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (_dir, app) = test_app(1024).await;

    let response = app.oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_upload_file_then_fetch() {
    let (_dir, app) = test_app(1024 * 1024).await;
    let data: &[u8] = b"%PDF-1.7 quarterly numbers";

    let response = app
        .clone()
        .oneshot(upload_request(multipart_body(
            Some(("report.pdf", "application/pdf", data)),
            Some("Q3"),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let id = json["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 36);
    assert_eq!(json["filename"], "report.pdf");
    assert_eq!(json["share_url"], format!("{BASE_URL}/s/{id}"));

    // Metadata
    let response = app
        .clone()
        .oneshot(get(&format!("/api/file/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let info = body_json(response).await;
    assert_eq!(info["id"], id.as_str());
    assert_eq!(info["filetype"], "application/pdf");
    assert_eq!(info["filesize"], data.len());
    assert_eq!(info["description"], "Q3");

    // Download
    let response = app
        .clone()
        .oneshot(get(&format!("/api/download/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
    );
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(body_bytes(response).await, data);

    // Static serving of the raw blob
    let response = app
        .oneshot(get(&format!("/uploads/{id}.pdf")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, data);
}

#[tokio::test]
async fn test_upload_without_file() {
    let (_dir, app) = test_app(1024).await;

    let response = app
        .oneshot(upload_request(multipart_body(None, Some("lonely"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_file_part_without_filename() {
    let (dir, app) = test_app(1024).await;
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\nnot a file\r\n--{BOUNDARY}--\r\n"
    );

    let response = app
        .oneshot(upload_request(body.into_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file uploaded");
    let stored = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_upload_description_after_file() {
    let (_dir, app) = test_app(1024).await;
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\nContent-Type: text/plain\r\n\r\nsome notes\r\n\
         --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nafter the file\r\n\
         --{BOUNDARY}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(upload_request(body.into_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(get(&format!("/api/file/{id}")))
        .await
        .unwrap();
    let info = body_json(response).await;
    assert_eq!(info["filename"], "notes.txt");
    assert_eq!(info["filesize"], 10);
    assert_eq!(info["description"], "after the file");
}

#[tokio::test]
async fn test_upload_truncated_body_leaves_nothing() {
    let (dir, app) = test_app(1024).await;
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cut.bin\"\r\n\r\npartial content"
    );

    let response = app
        .oneshot(upload_request(body.into_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid multipart request");
    let stored = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_upload_too_large() {
    let (dir, app) = test_app(16).await;

    let response = app
        .oneshot(upload_request(multipart_body(
            Some(("big.bin", "application/octet-stream", [7u8; 64].as_slice())),
            None,
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "File too large");
    let stored = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_upload_text_end_to_end() {
    let (_dir, app) = test_app(1024).await;

    let response = app
        .clone()
        .oneshot(text_request(r#"{"content":"hello","description":""}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let id = json["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 36);
    assert_eq!(json["filename"], "text.txt");
    assert_eq!(json["share_url"], format!("{BASE_URL}/s/{id}"));

    let response = app
        .clone()
        .oneshot(get(&format!("/api/file/{id}")))
        .await
        .unwrap();
    let info = body_json(response).await;
    assert_eq!(info["filetype"], "text/plain");
    assert_eq!(info["filesize"], 5);
    assert_eq!(info["description"], "");

    // Text blobs preview inline.
    let response = app
        .oneshot(get(&format!("/api/preview/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(body_bytes(response).await, b"hello");
}

#[tokio::test]
async fn test_upload_text_rejects_bad_input() {
    let (_dir, app) = test_app(1024).await;

    let response = app.clone().oneshot(text_request("not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid request");

    let response = app
        .clone()
        .oneshot(text_request(r#"{"description":"no content"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(text_request(r#"{"content":""}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (_dir, app) = test_app(1024).await;

    for uri in ["/api/file/nope", "/api/download/nope", "/api/preview/nope"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body_json(response).await["error"], "File not found");
    }
}

#[tokio::test]
async fn test_preview_inline_and_metadata() {
    let (_dir, app) = test_app(1024).await;

    let response = app
        .clone()
        .oneshot(upload_request(multipart_body(
            Some(("Photo.PNG", "image/png", b"\x89PNG fake".as_slice())),
            None,
        )))
        .await
        .unwrap();
    let png_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/preview/{png_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(response).await, b"\x89PNG fake");

    let response = app
        .clone()
        .oneshot(upload_request(multipart_body(
            Some(("bundle.zip", "application/zip", b"PK\x03\x04".as_slice())),
            None,
        )))
        .await
        .unwrap();
    let zip_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(get(&format!("/api/preview/{zip_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], zip_id.as_str());
    assert_eq!(json["filename"], "bundle.zip");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (_dir, app) = test_app(1024).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, "https://elsewhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
