use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::info;

use stride_db::models::UserRow;
use stride_db::queries::UpdateOutcome;
use stride_types::api::{
    AvailabilityResponse, DeleteUserResponse, DeletedUser, RegisterRequest, UpdateUserRequest,
    UserResponse,
};
use stride_types::models::{User, parse_sqlite_datetime};
use stride_types::token::Claims;

use crate::error::ApiError;
use crate::password;
use crate::state::AppState;

pub(crate) fn user_to_api(row: UserRow) -> User {
    User {
        user_id: row.user_id,
        username: row.username,
        email: row.email,
        habit_id: row.habit_id,
        habit_frequency: row.habit_frequency,
        habit_name: row.habit_name,
        created_at: parse_sqlite_datetime(&row.created_at),
    }
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if !(3..=20).contains(&len) {
        return Err(ApiError::Validation("Username must be 3-20 characters"));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    }) && !email.contains(char::is_whitespace);
    if !valid {
        return Err(ApiError::Validation("Invalid email address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}

/// POST /users — register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let hash = password::hash_blocking(req.password).await?;

    let username = req.username;
    let email = req.email;
    let user_id = state
        .query(move |db| db.create_user(&username, &email, &hash))
        .await?
        .ok_or(ApiError::Conflict("Username or email already in use"))?;

    let user = state
        .query(move |db| db.get_user(user_id))
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user {user_id} missing after insert")))?;

    info!(user_id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User created".to_string(),
            user: user_to_api(user),
        }),
    ))
}

/// GET /users — public projections of every account.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let rows = state.query(|db| db.list_users()).await?;
    Ok(Json(rows.into_iter().map(user_to_api).collect()))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let row = state
        .query(move |db| db.get_user(id))
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user_to_api(row)))
}

/// GET /users/username/{username}
pub async fn check_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let taken = state
        .query(move |db| db.username_taken(&username))
        .await?;
    Ok(Json(AvailabilityResponse { available: !taken }))
}

/// GET /users/email/{email}
pub async fn check_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let taken = state.query(move |db| db.email_taken(&email)).await?;
    Ok(Json(AvailabilityResponse { available: !taken }))
}

/// GET /users/token — valid-token probe; re-fetches the token's account so
/// a token for a deleted account stops working even without revocation.
pub async fn check_token(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = claims.sub;
    let row = state
        .query(move |db| db.get_user(user_id))
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(UserResponse {
        message: "Token valid".to_string(),
        user: user_to_api(row),
    }))
}

/// PUT /users — partial update of the caller's own account.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if req.username.is_none() && req.email.is_none() && req.password.is_none() {
        return Err(ApiError::Validation("No fields to update"));
    }
    if let Some(ref username) = req.username {
        validate_username(username)?;
    }
    if let Some(ref email) = req.email {
        validate_email(email)?;
    }
    let password_hash = match req.password {
        Some(password) => {
            validate_password(&password)?;
            Some(password::hash_blocking(password).await?)
        }
        None => None,
    };

    let user_id = claims.sub;
    let outcome = state
        .query(move |db| {
            db.update_user(
                user_id,
                req.username.as_deref(),
                req.email.as_deref(),
                password_hash.as_deref(),
            )
        })
        .await?;
    match outcome {
        UpdateOutcome::Updated => {}
        UpdateOutcome::Duplicate => {
            return Err(ApiError::Conflict("Username or email already in use"));
        }
        UpdateOutcome::NotFound => return Err(ApiError::NotFound("User")),
    }

    let row = state
        .query(move |db| db.get_user(user_id))
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(UserResponse {
        message: "User updated".to_string(),
        user: user_to_api(row),
    }))
}

/// DELETE /users — removes the caller's account and everything it owns in
/// one transaction. A second call finds no user row and reports 404 with
/// nothing written.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let user_id = claims.sub;
    let deleted = state
        .query(move |db| db.delete_user_cascade(user_id))
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("User"));
    }

    info!(user_id, "user deleted with owned rows");
    Ok(Json(DeleteUserResponse {
        message: "User deleted".to_string(),
        user: DeletedUser { user_id },
    }))
}
