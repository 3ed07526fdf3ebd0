use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public projection of an account row. Never carries the password hash;
/// the selected habit is denormalized onto it the way the store joins it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub habit_id: Option<i64>,
    pub habit_frequency: Option<i64>,
    pub habit_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub habit_id: i64,
    pub habit_name: String,
    pub habit_description: String,
    pub habit_category: String,
    pub is_default: bool,
}

/// A post as the API serves it. `filename` and `thumbnail` are absolute URLs
/// on the upload server, composed at response time from the stored key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub post_title: String,
    pub post_text: String,
    pub filename: String,
    pub thumbnail: String,
    pub media_type: String,
    pub filesize: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub like_id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// `prompt_text` is only populated by queries that join the prompt table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reflection {
    pub reflection_id: i64,
    pub user_id: i64,
    pub prompt_id: i64,
    pub prompt_text: Option<String>,
    pub reflection_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub prompt_id: i64,
    pub prompt_text: String,
    pub prompt_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotivationMessage {
    pub message_id: i64,
    pub message_text: String,
    pub message_author: String,
}

/// SQLite's `datetime('now')` stores `"YYYY-MM-DD HH:MM:SS"` in UTC with no
/// zone marker. Rows that carry something unparseable fall back to now.
pub fn parse_sqlite_datetime(s: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .unwrap_or_else(|_| {
            tracing::warn!(value = %s, "unparseable stored timestamp, substituting now");
            Utc::now()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_sqlite_datetime_text() {
        let dt = parse_sqlite_datetime("2024-03-01 17:45:09");
        assert_eq!(dt.to_rfc3339(), "2024-03-01T17:45:09+00:00");
        assert_eq!(dt.minute(), 45);
    }

    #[test]
    fn garbage_timestamp_falls_back_to_now() {
        let before = Utc::now();
        let dt = parse_sqlite_datetime("not a timestamp");
        assert!(dt >= before);
    }
}
