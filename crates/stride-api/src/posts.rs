use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::info;

use stride_db::models::PostRow;
use stride_types::api::{CreatePostRequest, MessageResponse, PostResponse, UpdatePostRequest};
use stride_types::models::{Post, parse_sqlite_datetime};
use stride_types::token::Claims;

use crate::error::ApiError;
use crate::middleware::BearerToken;
use crate::state::MediaState;
use crate::uploads::UploadClient;

/// The store keeps only the bare filename; public URLs are composed here
/// so a relocated upload server never requires touching stored rows.
fn post_to_api(row: PostRow, uploads: &UploadClient) -> Post {
    Post {
        post_id: row.post_id,
        user_id: row.user_id,
        username: row.username,
        post_title: row.post_title,
        post_text: row.post_text,
        filename: uploads.file_url(&row.filename),
        thumbnail: uploads.thumbnail_url(&row.filename),
        media_type: row.media_type,
        filesize: row.filesize,
        created_at: parse_sqlite_datetime(&row.created_at),
    }
}

fn validate_filename(filename: &str) -> Result<(), ApiError> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(ApiError::Validation("Invalid filename"));
    }
    Ok(())
}

/// GET /posts — every post, newest first.
pub async fn list_posts(State(state): State<MediaState>) -> Result<Json<Vec<Post>>, ApiError> {
    let rows = state.app.query(|db| db.list_posts()).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| post_to_api(row, &state.uploads))
            .collect(),
    ))
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<MediaState>,
    Path(id): Path<i64>,
) -> Result<Json<Post>, ApiError> {
    let row = state
        .app
        .query(move |db| db.get_post(id))
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    Ok(Json(post_to_api(row, &state.uploads)))
}

/// POST /posts — create a post referencing an already-uploaded file.
/// The owner is always the token's subject, regardless of the body.
pub async fn create_post(
    State(state): State<MediaState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    if req.post_title.is_empty() || req.post_title.chars().count() > 100 {
        return Err(ApiError::Validation("Title must be 1-100 characters"));
    }
    if req.post_text.is_empty() {
        return Err(ApiError::Validation("Post text must not be empty"));
    }
    validate_filename(&req.filename)?;
    if req.media_type.is_empty() {
        return Err(ApiError::Validation("Missing media type"));
    }
    if req.filesize <= 0 {
        return Err(ApiError::Validation("Invalid filesize"));
    }

    let user_id = claims.sub;
    let row = state
        .app
        .query(move |db| {
            db.create_post(
                user_id,
                &req.post_title,
                &req.post_text,
                &req.filename,
                &req.media_type,
                req.filesize,
            )
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            message: "Post created".to_string(),
            post: post_to_api(row, &state.uploads),
        }),
    ))
}

/// PUT /posts/{id} — owner-filtered title/text update.
pub async fn update_post(
    State(state): State<MediaState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    if req.post_title.is_none() && req.post_text.is_none() {
        return Err(ApiError::Validation("No fields to update"));
    }
    if let Some(ref title) = req.post_title {
        if title.is_empty() || title.chars().count() > 100 {
            return Err(ApiError::Validation("Title must be 1-100 characters"));
        }
    }

    let user_id = claims.sub;
    let updated = state
        .app
        .query(move |db| {
            db.update_post(id, user_id, req.post_title.as_deref(), req.post_text.as_deref())
        })
        .await?;
    if !updated {
        return Err(ApiError::NotFound("Post"));
    }

    let row = state
        .app
        .query(move |db| db.get_post(id))
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    Ok(Json(PostResponse {
        message: "Post updated".to_string(),
        post: post_to_api(row, &state.uploads),
    }))
}

/// DELETE /posts/{id} — removes a post and its stored media file.
///
/// The local transaction (likes, comments, post row filtered by owner) is
/// committed first; only then is the upload service asked to drop the file,
/// with the caller's own token. The two stores cannot share a transaction,
/// so a remote failure leaves an orphaned file for the reconciliation
/// sweep and the response still reports success — the local row is the
/// authoritative record and it is already gone.
pub async fn delete_post(
    State(state): State<MediaState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Extension(token): Extension<BearerToken>,
) -> Result<Json<MessageResponse>, ApiError> {
    let post = state
        .app
        .query(move |db| db.get_post(id))
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    if post.user_id != claims.sub {
        return Err(ApiError::Forbidden);
    }

    let user_id = claims.sub;
    let deleted = state
        .app
        .query(move |db| db.delete_post_owned(id, user_id))
        .await?;
    if !deleted {
        // The ownership check passed, so the row vanished between the
        // lookup and the transaction.
        return Err(ApiError::NotFound("Post"));
    }

    info!(post_id = id, user_id, "post deleted");
    state.uploads.delete_file(id, &post.filename, &token.0).await;

    Ok(Json(MessageResponse::new("Post deleted")))
}
