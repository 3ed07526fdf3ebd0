use axum::Json;
use axum::extract::State;

use stride_types::models::MotivationMessage;

use crate::error::ApiError;
use crate::state::MediaState;

/// GET /messages — a random motivational message not yet served today.
/// 404 once the day's pool is exhausted; tomorrow it refills.
pub async fn next_message(
    State(state): State<MediaState>,
) -> Result<Json<MotivationMessage>, ApiError> {
    let row = state
        .app
        .query(|db| db.next_motivation_message())
        .await?
        .ok_or(ApiError::NotFound("Message"))?;
    Ok(Json(MotivationMessage {
        message_id: row.message_id,
        message_text: row.message_text,
        message_author: row.message_author,
    }))
}
