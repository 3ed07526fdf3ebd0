use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use stride_db::models::HabitRow;
use stride_db::queries::InsertOutcome;
use stride_types::api::{
    CompletionRequest, CreateHabitRequest, FrequencyRequest, FrequencyResponse, HabitResponse,
    MessageResponse, SelectHabitRequest,
};
use stride_types::models::Habit;
use stride_types::token::Claims;

use crate::error::ApiError;
use crate::state::AppState;

fn habit_to_api(row: HabitRow) -> Habit {
    Habit {
        habit_id: row.habit_id,
        habit_name: row.habit_name,
        habit_description: row.habit_description,
        habit_category: row.habit_category,
        is_default: row.is_default,
    }
}

/// GET /habits
pub async fn list_habits(State(state): State<AppState>) -> Result<Json<Vec<Habit>>, ApiError> {
    let rows = state.query(|db| db.list_habits()).await?;
    Ok(Json(rows.into_iter().map(habit_to_api).collect()))
}

/// GET /habits/created — only user-created habits.
pub async fn list_created_habits(
    State(state): State<AppState>,
) -> Result<Json<Vec<Habit>>, ApiError> {
    let rows = state.query(|db| db.list_created_habits()).await?;
    Ok(Json(rows.into_iter().map(habit_to_api).collect()))
}

/// GET /habits/{id}
pub async fn get_habit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Habit>, ApiError> {
    let row = state
        .query(move |db| db.get_habit(id))
        .await?
        .ok_or(ApiError::NotFound("Habit"))?;
    Ok(Json(habit_to_api(row)))
}

/// GET /habits/created/{id}
pub async fn get_created_habit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Habit>, ApiError> {
    let row = state
        .query(move |db| db.get_created_habit(id))
        .await?
        .ok_or(ApiError::NotFound("Habit"))?;
    Ok(Json(habit_to_api(row)))
}

/// POST /habits — create a custom habit and select it for the caller.
/// The habit insert and the selection update commit together.
pub async fn create_habit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitResponse>), ApiError> {
    if req.habit_name.is_empty() || req.habit_description.is_empty() || req.habit_category.is_empty()
    {
        return Err(ApiError::Validation("Missing required fields"));
    }

    let user_id = claims.sub;
    let habit = state
        .query(move |db| {
            db.create_habit_for_user(
                user_id,
                &req.habit_name,
                &req.habit_description,
                &req.habit_category,
            )
        })
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok((
        StatusCode::CREATED,
        Json(HabitResponse {
            message: "Habit created".to_string(),
            habit: habit_to_api(habit),
        }),
    ))
}

/// PUT /habits — select an existing habit for the caller.
pub async fn select_habit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SelectHabitRequest>,
) -> Result<Json<HabitResponse>, ApiError> {
    let user_id = claims.sub;
    let habit_id = req.habit_id;

    let selected = state
        .query(move |db| db.select_habit(user_id, habit_id))
        .await?;
    if !selected {
        return Err(ApiError::NotFound("Habit"));
    }

    let habit = state
        .query(move |db| db.get_habit(habit_id))
        .await?
        .ok_or(ApiError::NotFound("Habit"))?;
    Ok(Json(HabitResponse {
        message: "Habit selected".to_string(),
        habit: habit_to_api(habit),
    }))
}

/// POST /habits/frequency
pub async fn set_frequency(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<FrequencyRequest>,
) -> Result<Json<FrequencyResponse>, ApiError> {
    if req.habit_frequency < 1 {
        return Err(ApiError::Validation("Frequency must be positive"));
    }

    let user_id = claims.sub;
    let frequency = req.habit_frequency;
    let updated = state
        .query(move |db| db.set_habit_frequency(user_id, frequency))
        .await?;
    if !updated {
        return Err(ApiError::NotFound("User"));
    }

    Ok(Json(FrequencyResponse {
        message: "Frequency updated".to_string(),
        habit_frequency: req.habit_frequency,
    }))
}

/// GET /habits/dates/{id} — the caller's completion dates for a habit.
pub async fn list_completions(
    State(state): State<AppState>,
    Path(habit_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<String>>, ApiError> {
    let user_id = claims.sub;
    let dates = state
        .query(move |db| db.list_completions(habit_id, user_id))
        .await?;
    Ok(Json(dates))
}

/// POST /habits/dates/{id} — record a completion date for the caller.
pub async fn add_completion(
    State(state): State<AppState>,
    Path(habit_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CompletionRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let user_id = claims.sub;
    let date = req.date.to_string();
    let outcome = state
        .query(move |db| db.add_completion(habit_id, user_id, &date))
        .await?;
    match outcome {
        InsertOutcome::Created => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new("Date added")),
        )),
        InsertOutcome::AlreadyExists => Err(ApiError::Conflict("Date already recorded")),
        InsertOutcome::ParentMissing => Err(ApiError::NotFound("Habit")),
    }
}
