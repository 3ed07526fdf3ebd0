use anyhow::Result;
use rusqlite::{Connection, params};

use super::{ConstraintKind, OptionalExt, constraint_kind};
use crate::models::{AuthRow, UserRow};
use crate::{Database, TxOutcome};

/// Outcome of an account update that can both miss its row and collide
/// with a uniqueness rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    Duplicate,
    NotFound,
}

const USER_SELECT: &str = "SELECT u.user_id, u.username, u.email, u.habit_id,
            u.habit_frequency, h.habit_name, u.created_at
     FROM users u
     LEFT JOIN habits h ON u.habit_id = h.habit_id";

impl Database {
    // -- Users --

    /// Inserts a new account. Returns `None` when the username or email is
    /// already taken (the UNIQUE constraints double as the duplicate check).
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<i64>> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)",
                params![username, email, password_hash],
            );
            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(e) if constraint_kind(&e) == Some(ConstraintKind::Unique) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, user_id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{USER_SELECT} ORDER BY u.user_id"))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Credential lookup for login; the only query that reads the password
    /// column.
    pub fn get_auth_by_username(&self, username: &str) -> Result<Option<AuthRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT user_id, password FROM users WHERE username = ?1",
                    [username],
                    |row| {
                        Ok(AuthRow {
                            user_id: row.get(0)?,
                            password: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn username_taken(&self, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let hit: Option<i64> = conn
                .query_row(
                    "SELECT user_id FROM users WHERE username = ?1",
                    [username],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(hit.is_some())
        })
    }

    pub fn email_taken(&self, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let hit: Option<i64> = conn
                .query_row(
                    "SELECT user_id FROM users WHERE email = ?1",
                    [email],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(hit.is_some())
        })
    }

    /// Partial account update; only the fields passed as `Some` change.
    pub fn update_user(
        &self,
        user_id: i64,
        username: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<UpdateOutcome> {
        self.with_conn_mut(|conn| {
            let mut sets: Vec<&str> = Vec::new();
            let mut values: Vec<&dyn rusqlite::types::ToSql> = Vec::new();
            if let Some(ref v) = username {
                sets.push("username = ?");
                values.push(v);
            }
            if let Some(ref v) = email {
                sets.push("email = ?");
                values.push(v);
            }
            if let Some(ref v) = password_hash {
                sets.push("password = ?");
                values.push(v);
            }
            if sets.is_empty() {
                anyhow::bail!("update_user called with no fields");
            }
            let sql = format!("UPDATE users SET {} WHERE user_id = ?", sets.join(", "));
            values.push(&user_id);

            let updated = conn.execute(&sql, values.as_slice());
            match updated {
                Ok(0) => Ok(UpdateOutcome::NotFound),
                Ok(_) => Ok(UpdateOutcome::Updated),
                Err(e) if constraint_kind(&e) == Some(ConstraintKind::Unique) => {
                    Ok(UpdateOutcome::Duplicate)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Deletes an account and every row that depends on it in one
    /// transaction: likes and comments the account authored or that sit on
    /// its posts, its posts, reflections, completion history, and habits it
    /// created (other accounts pointing at one of those get their selection
    /// cleared first). The account row goes last; zero rows affected there
    /// means the account was already gone, and the whole run rolls back.
    pub fn delete_user_cascade(&self, user_id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM likes WHERE user_id = ?1
                    OR post_id IN (SELECT post_id FROM posts WHERE user_id = ?1)",
                [user_id],
            )?;
            tx.execute(
                "DELETE FROM comments WHERE user_id = ?1
                    OR post_id IN (SELECT post_id FROM posts WHERE user_id = ?1)",
                [user_id],
            )?;
            tx.execute("DELETE FROM posts WHERE user_id = ?1", [user_id])?;
            tx.execute("DELETE FROM reflections WHERE user_id = ?1", [user_id])?;
            tx.execute(
                "DELETE FROM habit_completions WHERE user_id = ?1",
                [user_id],
            )?;
            // Habits this account created: clear every selection of them
            // (including the account's own), drop remaining completion
            // history, then the habit rows.
            tx.execute(
                "UPDATE users SET habit_id = NULL
                 WHERE habit_id IN (SELECT habit_id FROM habits WHERE created_by = ?1)",
                [user_id],
            )?;
            tx.execute(
                "DELETE FROM habit_completions
                 WHERE habit_id IN (SELECT habit_id FROM habits WHERE created_by = ?1)",
                [user_id],
            )?;
            tx.execute("DELETE FROM habits WHERE created_by = ?1", [user_id])?;

            let deleted = tx.execute("DELETE FROM users WHERE user_id = ?1", [user_id])?;
            if deleted == 0 {
                return Ok(TxOutcome::Rollback(false));
            }
            Ok(TxOutcome::Commit(true))
        })
    }
}

pub(super) fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        user_id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        habit_id: row.get(3)?,
        habit_frequency: row.get(4)?,
        habit_name: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn query_user(conn: &Connection, user_id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT} WHERE u.user_id = ?1"))?;
    let row = stmt.query_row([user_id], user_from_row).optional()?;
    Ok(row)
}
