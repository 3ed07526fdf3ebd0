//! Database row types. Distinct from the stride-types API models so the
//! store layer stays independent; timestamps stay as the TEXT the store
//! wrote and are parsed at the edge.

pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub habit_id: Option<i64>,
    pub habit_frequency: Option<i64>,
    pub habit_name: Option<String>,
    pub created_at: String,
}

/// Credential lookup result for login; the only shape that carries the
/// stored password hash.
pub struct AuthRow {
    pub user_id: i64,
    pub password: String,
}

pub struct HabitRow {
    pub habit_id: i64,
    pub habit_name: String,
    pub habit_description: String,
    pub habit_category: String,
    pub is_default: bool,
    pub created_by: Option<i64>,
}

pub struct PostRow {
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub post_title: String,
    pub post_text: String,
    pub filename: String,
    pub media_type: String,
    pub filesize: i64,
    pub created_at: String,
}

pub struct CommentRow {
    pub comment_id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub comment_text: String,
    pub created_at: String,
}

pub struct LikeRow {
    pub like_id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub created_at: String,
}

pub struct ReflectionRow {
    pub reflection_id: i64,
    pub user_id: i64,
    pub prompt_id: i64,
    pub prompt_text: Option<String>,
    pub reflection_text: String,
    pub created_at: String,
}

pub struct PromptRow {
    pub prompt_id: i64,
    pub prompt_text: String,
    pub prompt_type: String,
}

pub struct MessageRow {
    pub message_id: i64,
    pub message_text: String,
    pub message_author: String,
}
