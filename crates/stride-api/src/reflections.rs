use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use stride_db::models::ReflectionRow;
use stride_db::queries::InsertOutcome;
use stride_types::api::{CreateReflectionRequest, MessageResponse};
use stride_types::models::{Prompt, Reflection, parse_sqlite_datetime};
use stride_types::token::Claims;

use crate::error::ApiError;
use crate::state::MediaState;

fn reflection_to_api(row: ReflectionRow) -> Reflection {
    Reflection {
        reflection_id: row.reflection_id,
        user_id: row.user_id,
        prompt_id: row.prompt_id,
        prompt_text: row.prompt_text,
        reflection_text: row.reflection_text,
        created_at: parse_sqlite_datetime(&row.created_at),
    }
}

/// GET /reflections
pub async fn list_reflections(
    State(state): State<MediaState>,
) -> Result<Json<Vec<Reflection>>, ApiError> {
    let rows = state.app.query(|db| db.list_reflections()).await?;
    Ok(Json(rows.into_iter().map(reflection_to_api).collect()))
}

/// GET /reflections/byuser/{id}
pub async fn reflections_by_user(
    State(state): State<MediaState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Reflection>>, ApiError> {
    let rows = state
        .app
        .query(move |db| db.reflections_by_user(user_id))
        .await?;
    Ok(Json(rows.into_iter().map(reflection_to_api).collect()))
}

/// POST /reflections — store the caller's answer to a prompt.
pub async fn create_reflection(
    State(state): State<MediaState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateReflectionRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if req.reflection_text.is_empty() {
        return Err(ApiError::Validation("Reflection text must not be empty"));
    }

    let user_id = claims.sub;
    let outcome = state
        .app
        .query(move |db| db.create_reflection(user_id, req.prompt_id, &req.reflection_text))
        .await?;
    match outcome {
        InsertOutcome::Created => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new("Reflection created")),
        )),
        InsertOutcome::ParentMissing => Err(ApiError::NotFound("Prompt")),
        InsertOutcome::AlreadyExists => Err(ApiError::Conflict("Reflection already exists")),
    }
}

/// GET /reflections/prompts
pub async fn list_prompts(State(state): State<MediaState>) -> Result<Json<Vec<Prompt>>, ApiError> {
    let rows = state.app.query(|db| db.list_prompts()).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| Prompt {
                prompt_id: row.prompt_id,
                prompt_text: row.prompt_text,
                prompt_type: row.prompt_type,
            })
            .collect(),
    ))
}
