use anyhow::Result;
use rusqlite::{Connection, params};

use super::{ConstraintKind, InsertOutcome, constraint_kind};
use crate::Database;
use crate::models::{PromptRow, ReflectionRow};

const REFLECTION_SELECT: &str = "SELECT r.reflection_id, r.user_id, r.prompt_id,
            p.prompt_text, r.reflection_text, r.created_at
     FROM reflections r
     LEFT JOIN prompts p ON r.prompt_id = p.prompt_id";

impl Database {
    // -- Reflections --

    pub fn list_reflections(&self) -> Result<Vec<ReflectionRow>> {
        self.with_conn(|conn| {
            query_reflections(
                conn,
                &format!(
                    "{REFLECTION_SELECT} ORDER BY r.created_at DESC, r.reflection_id DESC"
                ),
                [],
            )
        })
    }

    pub fn reflections_by_user(&self, user_id: i64) -> Result<Vec<ReflectionRow>> {
        self.with_conn(|conn| {
            query_reflections(
                conn,
                &format!(
                    "{REFLECTION_SELECT} WHERE r.user_id = ?1
                     ORDER BY r.created_at DESC, r.reflection_id DESC"
                ),
                [user_id],
            )
        })
    }

    /// Stores a reflection against a prompt. `ParentMissing` when the
    /// prompt id does not exist.
    pub fn create_reflection(
        &self,
        user_id: i64,
        prompt_id: i64,
        text: &str,
    ) -> Result<InsertOutcome> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO reflections (user_id, prompt_id, reflection_text) VALUES (?1, ?2, ?3)",
                params![user_id, prompt_id, text],
            );
            match inserted {
                Ok(_) => Ok(InsertOutcome::Created),
                Err(e) if constraint_kind(&e) == Some(ConstraintKind::ForeignKey) => {
                    Ok(InsertOutcome::ParentMissing)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn list_prompts(&self) -> Result<Vec<PromptRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT prompt_id, prompt_text, prompt_type FROM prompts ORDER BY prompt_id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(PromptRow {
                        prompt_id: row.get(0)?,
                        prompt_text: row.get(1)?,
                        prompt_type: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn reflection_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReflectionRow> {
    Ok(ReflectionRow {
        reflection_id: row.get(0)?,
        user_id: row.get(1)?,
        prompt_id: row.get(2)?,
        prompt_text: row.get(3)?,
        reflection_text: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_reflections<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<ReflectionRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, reflection_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
