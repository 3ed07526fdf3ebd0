//! End-to-end tests for the upload service: storing raw bytes, deleting
//! them, and the shared-token authorization check, all through the router
//! without binding a socket.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use stride_types::token::TokenSigner;
use stride_upload_server::routes::{self, AppState};
use stride_upload_server::storage::Storage;

const TEST_SECRET: &str = "upload-test-secret";

async fn harness() -> (Router, Arc<Storage>, TokenSigner, TempDir) {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(Storage::new(dir.path().to_path_buf()).await.unwrap());
    let signer = TokenSigner::new(TEST_SECRET);
    let app = routes::router(AppState {
        storage: storage.clone(),
        signer: signer.clone(),
    });
    (app, storage, signer, dir)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<(&str, Vec<u8>)>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some((content_type, bytes)) => builder
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(bytes))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn upload_then_delete_round_trip() {
    let (app, storage, signer, _dir) = harness().await;
    let token = signer.issue(7).unwrap();
    let payload = vec![0xAB; 4096];

    let (status, body) = send(
        &app,
        Method::POST,
        "/upload",
        Some(&token),
        Some(("image/png", payload.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "File uploaded");
    assert_eq!(body["data"]["media_type"], "image/png");
    assert_eq!(body["data"]["filesize"], payload.len());
    let filename = body["data"]["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with(".png"), "got {filename}");

    // The bytes really landed on disk under the generated name.
    assert!(storage.exists(&filename).await);
    let stored = tokio::fs::read(storage.file_path(&filename)).await.unwrap();
    assert_eq!(stored, payload);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/delete/{filename}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "File deleted");
    assert!(!storage.exists(&filename).await);

    // A rerun has nothing left to remove.
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/delete/{filename}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn every_route_rejects_bad_credentials() {
    let (app, _storage, _signer, _dir) = harness().await;
    let foreign = TokenSigner::new("some-other-secret").issue(7).unwrap();

    for token in [None, Some("not.a.token"), Some(foreign.as_str())] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/upload",
            token,
            Some(("image/png", vec![1, 2, 3])),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "upload with {token:?}");

        let (status, _) = send(&app, Method::DELETE, "/delete/a.png", token, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "delete with {token:?}");
    }
}

#[tokio::test]
async fn empty_uploads_are_rejected() {
    let (app, _storage, signer, _dir) = harness().await;
    let token = signer.issue(7).unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/upload",
        Some(&token),
        Some(("image/png", Vec::new())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_media_types_fall_back_to_bin() {
    let (app, _storage, signer, _dir) = harness().await;
    let token = signer.issue(7).unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/upload",
        Some(&token),
        Some(("application/x-custom", vec![9, 9, 9])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["media_type"], "application/x-custom");
    let filename = body["data"]["filename"].as_str().unwrap();
    assert!(filename.ends_with(".bin"), "got {filename}");
}

#[tokio::test]
async fn video_uploads_keep_their_extension() {
    let (app, _storage, signer, _dir) = harness().await;
    let token = signer.issue(7).unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/upload",
        Some(&token),
        Some(("video/mp4", vec![0; 64])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let filename = body["data"]["filename"].as_str().unwrap();
    assert!(filename.ends_with(".mp4"), "got {filename}");
}

#[tokio::test]
async fn delete_refuses_traversal_shaped_names() {
    let (app, storage, signer, _dir) = harness().await;
    let token = signer.issue(7).unwrap();
    storage.save_file("victim.png", &[1, 2, 3]).await.unwrap();

    // %2F and %5C decode to separators inside the single path segment.
    for uri in [
        "/delete/..%2Fvictim.png",
        "/delete/%2e%2e%2fvictim.png",
        "/delete/a%5Cb.png",
        "/delete/sub%2Fvictim.png",
    ] {
        let (status, _) = send(&app, Method::DELETE, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {uri}");
    }
    assert!(storage.exists("victim.png").await);
}

#[tokio::test]
async fn deleting_a_file_that_never_existed_is_not_found() {
    let (app, _storage, signer, _dir) = harness().await;
    let token = signer.issue(7).unwrap();

    let (status, _) = send(&app, Method::DELETE, "/delete/ghost.png", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_needs_no_token() {
    let (app, _storage, _signer, _dir) = harness().await;
    let (status, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn storage_deletes_report_whether_anything_was_removed() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path().to_path_buf()).await.unwrap();

    storage.save_file("a.png", &[1]).await.unwrap();
    assert!(storage.delete_file("a.png").await.unwrap());
    assert!(!storage.delete_file("a.png").await.unwrap());
}
