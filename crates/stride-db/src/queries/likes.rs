use anyhow::Result;
use rusqlite::{Connection, params};

use super::{ConstraintKind, InsertOutcome, OptionalExt, constraint_kind};
use crate::Database;
use crate::models::LikeRow;

const LIKE_SELECT: &str =
    "SELECT like_id, post_id, user_id, created_at FROM likes";

impl Database {
    // -- Likes --

    pub fn list_likes(&self) -> Result<Vec<LikeRow>> {
        self.with_conn(|conn| {
            query_likes(conn, &format!("{LIKE_SELECT} ORDER BY like_id"), [])
        })
    }

    /// Check-then-insert like guard. The pre-check catches most repeats;
    /// the `UNIQUE(post_id, user_id)` constraint backstops the window where
    /// two writers pass the check together. Both paths report
    /// `AlreadyExists` so the caller sees one deterministic outcome.
    pub fn insert_like(&self, post_id: i64, user_id: i64) -> Result<InsertOutcome> {
        self.with_conn_mut(|conn| {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT like_id FROM likes WHERE post_id = ?1 AND user_id = ?2",
                    params![post_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Ok(InsertOutcome::AlreadyExists);
            }

            let inserted = conn.execute(
                "INSERT INTO likes (post_id, user_id) VALUES (?1, ?2)",
                params![post_id, user_id],
            );
            match inserted {
                Ok(_) => Ok(InsertOutcome::Created),
                Err(e) => match constraint_kind(&e) {
                    Some(ConstraintKind::Unique) => Ok(InsertOutcome::AlreadyExists),
                    Some(ConstraintKind::ForeignKey) => Ok(InsertOutcome::ParentMissing),
                    None => Err(e.into()),
                },
            }
        })
    }

    /// Removes the caller's like from a post; `false` when there was none.
    pub fn delete_like(&self, post_id: i64, user_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute(
                "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
                params![post_id, user_id],
            )?;
            Ok(deleted > 0)
        })
    }

    pub fn likes_by_post(&self, post_id: i64) -> Result<Vec<LikeRow>> {
        self.with_conn(|conn| {
            query_likes(
                conn,
                &format!("{LIKE_SELECT} WHERE post_id = ?1 ORDER BY like_id"),
                [post_id],
            )
        })
    }

    pub fn likes_by_user(&self, user_id: i64) -> Result<Vec<LikeRow>> {
        self.with_conn(|conn| {
            query_likes(
                conn,
                &format!("{LIKE_SELECT} WHERE user_id = ?1 ORDER BY like_id"),
                [user_id],
            )
        })
    }

    pub fn like_for_post_and_user(&self, post_id: i64, user_id: i64) -> Result<Option<LikeRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{LIKE_SELECT} WHERE post_id = ?1 AND user_id = ?2"))?;
            let row = stmt
                .query_row(params![post_id, user_id], like_from_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn like_count(&self, post_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}

fn like_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LikeRow> {
    Ok(LikeRow {
        like_id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn query_likes<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<LikeRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, like_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
