use axum::Json;
use axum::extract::State;
use tracing::info;

use stride_types::api::{LoginRequest, LoginResponse};

use crate::error::ApiError;
use crate::password;
use crate::state::AppState;
use crate::users::user_to_api;

/// POST /auth/login — verify credentials and issue a token. A wrong
/// username and a wrong password both land on the same 401 so the
/// response doesn't leak which half was wrong.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = req.username.clone();
    let auth = state
        .query(move |db| db.get_auth_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthorized("Invalid username or password"))?;

    let ok = password::verify_blocking(req.password, auth.password).await?;
    if !ok {
        return Err(ApiError::Unauthorized("Invalid username or password"));
    }

    let token = state
        .signer
        .issue(auth.user_id)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("token signing failed: {e}")))?;

    let user_id = auth.user_id;
    let user = state
        .query(move |db| db.get_user(user_id))
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    info!(user_id, "login");
    Ok(Json(LoginResponse {
        message: "Logged in".to_string(),
        token,
        user: user_to_api(user),
    }))
}
