use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Comment, Habit, Post, User};

// -- Generic envelopes --

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// All fields optional; a request carrying none of them is rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct DeletedUser {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: String,
    pub user: DeletedUser,
}

// -- Habits --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateHabitRequest {
    pub habit_name: String,
    pub habit_description: String,
    pub habit_category: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectHabitRequest {
    pub habit_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrequencyRequest {
    pub habit_frequency: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct HabitResponse {
    pub message: String,
    pub habit: Habit,
}

#[derive(Debug, Serialize)]
pub struct FrequencyResponse {
    pub message: String,
    pub habit_frequency: i64,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub post_title: String,
    pub post_text: String,
    pub filename: String,
    pub media_type: String,
    pub filesize: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    pub post_title: Option<String>,
    pub post_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub message: String,
    pub post: Post,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    pub comment_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCommentRequest {
    pub comment_text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub message: String,
    pub comment: Comment,
}

// -- Likes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLikeRequest {
    pub post_id: i64,
}

// -- Reflections --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReflectionRequest {
    pub prompt_id: i64,
    pub reflection_text: String,
}

// -- Uploads --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadData {
    pub filename: String,
    pub media_type: String,
    pub filesize: i64,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub data: UploadData,
}
