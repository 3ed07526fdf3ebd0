use anyhow::Result;
use rusqlite::{Connection, params};

use super::{ConstraintKind, OptionalExt, constraint_kind};
use crate::Database;
use crate::models::CommentRow;

const COMMENT_SELECT: &str = "SELECT c.comment_id, c.post_id, c.user_id, u.username,
            c.comment_text, c.created_at
     FROM comments c
     LEFT JOIN users u ON c.user_id = u.user_id";

impl Database {
    // -- Comments --

    pub fn list_comments(&self) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            query_comments(
                conn,
                &format!("{COMMENT_SELECT} ORDER BY c.created_at DESC, c.comment_id DESC"),
                [],
            )
        })
    }

    /// Comments on a post, oldest first (thread order).
    pub fn comments_by_post(&self, post_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            query_comments(
                conn,
                &format!(
                    "{COMMENT_SELECT} WHERE c.post_id = ?1 ORDER BY c.created_at, c.comment_id"
                ),
                [post_id],
            )
        })
    }

    pub fn comments_by_user(&self, user_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            query_comments(
                conn,
                &format!(
                    "{COMMENT_SELECT} WHERE c.user_id = ?1 ORDER BY c.created_at DESC, c.comment_id DESC"
                ),
                [user_id],
            )
        })
    }

    pub fn comment_count(&self, post_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Inserts a comment and returns the stored row. `None` when the post
    /// is gone (the foreign key rejected the write).
    pub fn create_comment(
        &self,
        post_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<Option<CommentRow>> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO comments (post_id, user_id, comment_text) VALUES (?1, ?2, ?3)",
                params![post_id, user_id, text],
            );
            match inserted {
                Ok(_) => query_comment(conn, conn.last_insert_rowid()),
                Err(e) if constraint_kind(&e) == Some(ConstraintKind::ForeignKey) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Owner-filtered text update; `false` when the row is missing or
    /// belongs to someone else.
    pub fn update_comment(&self, comment_id: i64, user_id: i64, text: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE comments SET comment_text = ?1 WHERE comment_id = ?2 AND user_id = ?3",
                params![text, comment_id, user_id],
            )?;
            Ok(updated > 0)
        })
    }

    pub fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute(
                "DELETE FROM comments WHERE comment_id = ?1 AND user_id = ?2",
                params![comment_id, user_id],
            )?;
            Ok(deleted > 0)
        })
    }
}

pub(super) fn comment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        comment_id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        username: row
            .get::<_, Option<String>>(3)?
            .unwrap_or_else(|| "unknown".to_string()),
        comment_text: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_comment(conn: &Connection, comment_id: i64) -> Result<Option<CommentRow>> {
    let mut stmt = conn.prepare(&format!("{COMMENT_SELECT} WHERE c.comment_id = ?1"))?;
    let row = stmt.query_row([comment_id], comment_from_row).optional()?;
    Ok(row)
}

fn query_comments<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<CommentRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, comment_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
