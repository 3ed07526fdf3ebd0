use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use stride_db::models::CommentRow;
use stride_types::api::{
    CommentResponse, CountResponse, CreateCommentRequest, MessageResponse, UpdateCommentRequest,
};
use stride_types::models::{Comment, parse_sqlite_datetime};
use stride_types::token::Claims;

use crate::error::ApiError;
use crate::state::MediaState;

fn comment_to_api(row: CommentRow) -> Comment {
    Comment {
        comment_id: row.comment_id,
        post_id: row.post_id,
        user_id: row.user_id,
        username: row.username,
        comment_text: row.comment_text,
        created_at: parse_sqlite_datetime(&row.created_at),
    }
}

fn validate_text(text: &str) -> Result<(), ApiError> {
    let len = text.chars().count();
    if !(1..=255).contains(&len) {
        return Err(ApiError::Validation("Comment must be 1-255 characters"));
    }
    Ok(())
}

/// GET /comments
pub async fn list_comments(State(state): State<MediaState>) -> Result<Json<Vec<Comment>>, ApiError> {
    let rows = state.app.query(|db| db.list_comments()).await?;
    Ok(Json(rows.into_iter().map(comment_to_api).collect()))
}

/// GET /comments/bypost/{id} — thread order.
pub async fn comments_by_post(
    State(state): State<MediaState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let rows = state
        .app
        .query(move |db| db.comments_by_post(post_id))
        .await?;
    Ok(Json(rows.into_iter().map(comment_to_api).collect()))
}

/// GET /comments/byuser/{id}
pub async fn comments_by_user(
    State(state): State<MediaState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let rows = state
        .app
        .query(move |db| db.comments_by_user(user_id))
        .await?;
    Ok(Json(rows.into_iter().map(comment_to_api).collect()))
}

/// GET /comments/count/{id}
pub async fn comment_count(
    State(state): State<MediaState>,
    Path(post_id): Path<i64>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state
        .app
        .query(move |db| db.comment_count(post_id))
        .await?;
    Ok(Json(CountResponse { count }))
}

/// POST /comments
pub async fn create_comment(
    State(state): State<MediaState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    validate_text(&req.comment_text)?;

    let user_id = claims.sub;
    let row = state
        .app
        .query(move |db| db.create_comment(req.post_id, user_id, &req.comment_text))
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            message: "Comment created".to_string(),
            comment: comment_to_api(row),
        }),
    ))
}

/// PUT /comments/{id} — owner-filtered text update.
pub async fn update_comment(
    State(state): State<MediaState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateCommentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_text(&req.comment_text)?;

    let user_id = claims.sub;
    let updated = state
        .app
        .query(move |db| db.update_comment(id, user_id, &req.comment_text))
        .await?;
    if !updated {
        return Err(ApiError::NotFound("Comment"));
    }
    Ok(Json(MessageResponse::new("Comment updated")))
}

/// DELETE /comments/{id} — owner-filtered delete.
pub async fn delete_comment(
    State(state): State<MediaState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = claims.sub;
    let deleted = state
        .app
        .query(move |db| db.delete_comment(id, user_id))
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Comment"));
    }
    Ok(Json(MessageResponse::new("Comment deleted")))
}
