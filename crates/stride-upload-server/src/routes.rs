use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tracing::{info, warn};
use uuid::Uuid;

use stride_types::api::{MessageResponse, UploadData, UploadResponse};
use stride_types::token::{Claims, TokenSigner};

use crate::storage::Storage;

/// 50 MB upload limit.
const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub signer: TokenSigner,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/delete/{filename}", delete(delete_file))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE))
        .with_state(state)
}

/// This service runs standalone, so it checks the bearer token itself —
/// same contract, same signer type as the API services.
fn extract_claims(headers: &HeaderMap, signer: &TokenSigner) -> Result<Claims, StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    signer.verify(token).map_err(|_| StatusCode::UNAUTHORIZED)
}

/// A storage key never names a path. Uploads only ever generate flat
/// `uuid.ext` names, so anything else in a delete URL is hostile.
fn valid_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename.len() <= 128
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}

fn extension_for(media_type: &str) -> &str {
    match media_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        _ => "bin",
    }
}

/// POST /upload — raw bytes in, generated storage key out. The caller
/// posts the body as `application/octet-stream`-style raw data with the
/// real media type in Content-Type.
async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<impl IntoResponse, StatusCode> {
    let claims = extract_claims(&headers, &state.signer)?;

    if bytes.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if bytes.len() > MAX_FILE_SIZE {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }

    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let filename = format!("{}.{}", Uuid::new_v4(), extension_for(&media_type));
    let filesize = bytes.len() as i64;

    state.storage.save_file(&filename, &bytes).await.map_err(|e| {
        warn!(filename, error = %e, "failed to store upload");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    info!(user_id = claims.sub, filename, filesize, "file uploaded");
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded".to_string(),
            data: UploadData {
                filename,
                media_type,
                filesize,
            },
        }),
    ))
}

/// DELETE /delete/{filename} — called by the media service after it has
/// committed a post deletion, and usable directly by clients cleaning up
/// an upload that never became a post.
async fn delete_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, StatusCode> {
    let claims = extract_claims(&headers, &state.signer)?;

    if !valid_filename(&filename) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let removed = state.storage.delete_file(&filename).await.map_err(|e| {
        warn!(filename, error = %e, "failed to delete stored file");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    if !removed {
        return Err(StatusCode::NOT_FOUND);
    }

    info!(user_id = claims.sub, filename, "file deleted");
    Ok(Json(MessageResponse::new("File deleted")))
}

/// GET /health — liveness check (no auth).
async fn health() -> &'static str {
    "ok"
}
