//! Harness for router-level tests: one in-memory database shared by an
//! auth router and a media router, driven through `tower::ServiceExt`
//! without binding real sockets (except for upload-server stubs).

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::Path;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use stride_api::router::{auth_router, media_router};
use stride_api::state::{AppState, AppStateInner, MediaState};
use stride_api::uploads::UploadClient;
use stride_db::Database;
use stride_types::token::TokenSigner;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn app_state() -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        signer: TokenSigner::new(TEST_SECRET),
    })
}

pub fn auth_app(state: &AppState) -> Router {
    auth_router(state.clone())
}

/// Media router over the shared state. `upload_url` may point at a stub
/// from [`spawn_upload_stub`] or at a dead port for tests that never
/// reach the remote delete (or that want it to fail).
pub fn media_app(state: &AppState, upload_url: &str) -> Router {
    media_router(MediaState {
        app: state.clone(),
        uploads: UploadClient::new(upload_url, Duration::from_millis(500)).unwrap(),
    })
}

/// One recorded call to the stub's delete endpoint.
#[derive(Debug, Clone)]
pub struct StubHit {
    pub filename: String,
    pub authorization: Option<String>,
}

/// Real upload-server stand-in on an ephemeral port. Answers
/// `DELETE /delete/{filename}` with `status` and records every hit.
pub async fn spawn_upload_stub(status: StatusCode) -> (String, Arc<Mutex<Vec<StubHit>>>) {
    let hits: Arc<Mutex<Vec<StubHit>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = hits.clone();

    let app = Router::new().route(
        "/delete/{filename}",
        axum::routing::delete(move |Path(filename): Path<String>, headers: HeaderMap| {
            let recorded = recorded.clone();
            async move {
                let authorization = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                recorded.lock().unwrap().push(StubHit {
                    filename,
                    authorization,
                });
                status
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), hits)
}

/// Upload-server stand-in that never answers within the media service's
/// client timeout.
pub async fn spawn_hanging_upload_stub() -> String {
    let app = Router::new().route(
        "/delete/{filename}",
        axum::routing::delete(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::OK
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Sends one request and returns status plus parsed JSON body (or `Null`
/// for empty/non-JSON bodies, like the health probe).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
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

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, token, None).await
}

/// Registers an account and logs it in. Returns `(user_id, token)`.
pub async fn register_and_login(auth: &Router, username: &str) -> (i64, String) {
    let (status, body) = post_json(
        auth,
        "/users",
        None,
        serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "hunter2hunter2",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    let user_id = body["user"]["user_id"].as_i64().unwrap();

    let (status, body) = post_json(
        auth,
        "/auth/login",
        None,
        serde_json::json!({ "username": username, "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let token = body["token"].as_str().unwrap().to_string();

    (user_id, token)
}

/// Creates a post owned by the token's account. Returns the post id.
pub async fn create_post(media: &Router, token: &str, title: &str, filename: &str) -> i64 {
    let (status, body) = post_json(
        media,
        "/posts",
        Some(token),
        serde_json::json!({
            "post_title": title,
            "post_text": "some words",
            "filename": filename,
            "media_type": "image/jpeg",
            "filesize": 1234,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create post failed: {body}");
    body["post"]["post_id"].as_i64().unwrap()
}
