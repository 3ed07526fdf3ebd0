use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use stride_db::models::LikeRow;
use stride_db::queries::InsertOutcome;
use stride_types::api::{CountResponse, CreateLikeRequest, MessageResponse};
use stride_types::models::{Like, parse_sqlite_datetime};
use stride_types::token::Claims;

use crate::error::ApiError;
use crate::state::MediaState;

fn like_to_api(row: LikeRow) -> Like {
    Like {
        like_id: row.like_id,
        post_id: row.post_id,
        user_id: row.user_id,
        created_at: parse_sqlite_datetime(&row.created_at),
    }
}

/// GET /likes
pub async fn list_likes(State(state): State<MediaState>) -> Result<Json<Vec<Like>>, ApiError> {
    let rows = state.app.query(|db| db.list_likes()).await?;
    Ok(Json(rows.into_iter().map(like_to_api).collect()))
}

/// POST /likes — at most one like per (post, caller). A repeat is a 409,
/// distinct from any write failure.
pub async fn create_like(
    State(state): State<MediaState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateLikeRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let user_id = claims.sub;
    let outcome = state
        .app
        .query(move |db| db.insert_like(req.post_id, user_id))
        .await?;
    match outcome {
        InsertOutcome::Created => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new("Like created")),
        )),
        InsertOutcome::AlreadyExists => Err(ApiError::Conflict("Already liked")),
        InsertOutcome::ParentMissing => Err(ApiError::NotFound("Post")),
    }
}

/// DELETE /likes/{post_id} — remove the caller's like from a post.
pub async fn delete_like(
    State(state): State<MediaState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = claims.sub;
    let deleted = state
        .app
        .query(move |db| db.delete_like(post_id, user_id))
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Like"));
    }
    Ok(Json(MessageResponse::new("Like removed")))
}

/// GET /likes/bypost/{id}
pub async fn likes_by_post(
    State(state): State<MediaState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let rows = state
        .app
        .query(move |db| db.likes_by_post(post_id))
        .await?;
    Ok(Json(rows.into_iter().map(like_to_api).collect()))
}

/// GET /likes/bypost/user/{id} — the caller's like on a post, if any.
pub async fn like_by_post_and_user(
    State(state): State<MediaState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Like>, ApiError> {
    let user_id = claims.sub;
    let row = state
        .app
        .query(move |db| db.like_for_post_and_user(post_id, user_id))
        .await?
        .ok_or(ApiError::NotFound("Like"))?;
    Ok(Json(like_to_api(row)))
}

/// GET /likes/byuser/{id}
pub async fn likes_by_user(
    State(state): State<MediaState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let rows = state
        .app
        .query(move |db| db.likes_by_user(user_id))
        .await?;
    Ok(Json(rows.into_iter().map(like_to_api).collect()))
}

/// GET /likes/count/{id}
pub async fn like_count(
    State(state): State<MediaState>,
    Path(post_id): Path<i64>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state.app.query(move |db| db.like_count(post_id)).await?;
    Ok(Json(CountResponse { count }))
}
