use anyhow::Result;
use rusqlite::{Connection, params};

use super::{ConstraintKind, InsertOutcome, OptionalExt, constraint_kind};
use crate::models::HabitRow;
use crate::{Database, TxOutcome};

const HABIT_SELECT: &str = "SELECT habit_id, habit_name, habit_description,
            habit_category, is_default, created_by
     FROM habits";

impl Database {
    // -- Habits --

    pub fn list_habits(&self) -> Result<Vec<HabitRow>> {
        self.with_conn(|conn| query_habits(conn, &format!("{HABIT_SELECT} ORDER BY habit_id")))
    }

    pub fn list_created_habits(&self) -> Result<Vec<HabitRow>> {
        self.with_conn(|conn| {
            query_habits(
                conn,
                &format!("{HABIT_SELECT} WHERE is_default = 0 ORDER BY habit_id"),
            )
        })
    }

    pub fn get_habit(&self, habit_id: i64) -> Result<Option<HabitRow>> {
        self.with_conn(|conn| query_habit(conn, habit_id))
    }

    pub fn get_created_habit(&self, habit_id: i64) -> Result<Option<HabitRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{HABIT_SELECT} WHERE habit_id = ?1 AND is_default = 0"))?;
            let row = stmt.query_row([habit_id], habit_from_row).optional()?;
            Ok(row)
        })
    }

    /// Creates a custom habit and makes it the creator's selected habit.
    /// Both writes share one transaction; if the account is gone the habit
    /// insert rolls back with it and `None` comes back.
    pub fn create_habit_for_user(
        &self,
        user_id: i64,
        name: &str,
        description: &str,
        category: &str,
    ) -> Result<Option<HabitRow>> {
        self.with_tx(|tx| {
            let inserted = tx.execute(
                "INSERT INTO habits (habit_name, habit_description, habit_category, is_default, created_by)
                 VALUES (?1, ?2, ?3, 0, ?4)",
                params![name, description, category, user_id],
            );
            if let Err(e) = inserted {
                // created_by references users; a vanished account trips it.
                if constraint_kind(&e) == Some(ConstraintKind::ForeignKey) {
                    return Ok(TxOutcome::Rollback(None));
                }
                return Err(e.into());
            }
            let habit_id = tx.last_insert_rowid();
            let updated = tx.execute(
                "UPDATE users SET habit_id = ?1 WHERE user_id = ?2",
                params![habit_id, user_id],
            )?;
            if updated == 0 {
                return Ok(TxOutcome::Rollback(None));
            }
            let row = query_habit(tx, habit_id)?;
            Ok(TxOutcome::Commit(row))
        })
    }

    /// Points the account at an existing habit. `false` when either side of
    /// the link is missing.
    pub fn select_habit(&self, user_id: i64, habit_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE users SET habit_id = ?1 WHERE user_id = ?2",
                params![habit_id, user_id],
            );
            match updated {
                Ok(n) => Ok(n > 0),
                Err(e) if constraint_kind(&e) == Some(ConstraintKind::ForeignKey) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn set_habit_frequency(&self, user_id: i64, frequency: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE users SET habit_frequency = ?1 WHERE user_id = ?2",
                params![frequency, user_id],
            )?;
            Ok(updated > 0)
        })
    }

    // -- Completions --

    /// Records a completion date. The composite primary key turns a repeat
    /// of the same date into `AlreadyExists`; a missing habit surfaces as
    /// `ParentMissing`.
    pub fn add_completion(&self, habit_id: i64, user_id: i64, date: &str) -> Result<InsertOutcome> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO habit_completions (habit_id, user_id, completed_on) VALUES (?1, ?2, ?3)",
                params![habit_id, user_id, date],
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

    pub fn list_completions(&self, habit_id: i64, user_id: i64) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT completed_on FROM habit_completions
                 WHERE habit_id = ?1 AND user_id = ?2
                 ORDER BY completed_on",
            )?;
            let rows = stmt
                .query_map(params![habit_id, user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

pub(super) fn habit_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HabitRow> {
    Ok(HabitRow {
        habit_id: row.get(0)?,
        habit_name: row.get(1)?,
        habit_description: row.get(2)?,
        habit_category: row.get(3)?,
        is_default: row.get(4)?,
        created_by: row.get(5)?,
    })
}

fn query_habit(conn: &Connection, habit_id: i64) -> Result<Option<HabitRow>> {
    let mut stmt = conn.prepare(&format!("{HABIT_SELECT} WHERE habit_id = ?1"))?;
    let row = stmt.query_row([habit_id], habit_from_row).optional()?;
    Ok(row)
}

fn query_habits(conn: &Connection, sql: &str) -> Result<Vec<HabitRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], habit_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn stock_habits_are_seeded() {
        let db = test_support::db();
        let habits = db.list_habits().unwrap();
        assert_eq!(habits.len(), 5);
        assert!(habits.iter().all(|h| h.is_default));
        assert!(db.list_created_habits().unwrap().is_empty());
    }

    #[test]
    fn create_habit_links_it_to_the_creator() {
        let db = test_support::db();
        let id = test_support::user(&db, "mara");
        let habit = db
            .create_habit_for_user(id, "Stretch", "Five minutes", "Fitness")
            .unwrap()
            .unwrap();
        assert!(!habit.is_default);
        assert_eq!(habit.created_by, Some(id));

        let user = db.get_user(id).unwrap().unwrap();
        assert_eq!(user.habit_id, Some(habit.habit_id));
        assert_eq!(
            db.get_created_habit(habit.habit_id).unwrap().unwrap().habit_name,
            "Stretch"
        );
    }

    #[test]
    fn create_habit_for_missing_user_leaves_no_habit_behind() {
        let db = test_support::db();
        let before = db.list_habits().unwrap().len();
        let out = db
            .create_habit_for_user(404, "Orphan", "", "None")
            .unwrap();
        assert!(out.is_none());
        assert_eq!(db.list_habits().unwrap().len(), before);
    }

    #[test]
    fn select_habit_rejects_missing_habit() {
        let db = test_support::db();
        let id = test_support::user(&db, "mara");
        assert!(!db.select_habit(id, 404).unwrap());
        assert!(!db.select_habit(404, 1).unwrap());
        assert!(db.select_habit(id, 1).unwrap());
    }

    #[test]
    fn completion_dates_accumulate_and_repeat_is_rejected() {
        let db = test_support::db();
        let id = test_support::user(&db, "mara");
        assert_eq!(
            db.add_completion(1, id, "2024-03-01").unwrap(),
            InsertOutcome::Created
        );
        assert_eq!(
            db.add_completion(1, id, "2024-03-02").unwrap(),
            InsertOutcome::Created
        );
        assert_eq!(
            db.add_completion(1, id, "2024-03-01").unwrap(),
            InsertOutcome::AlreadyExists
        );
        assert_eq!(
            db.list_completions(1, id).unwrap(),
            vec!["2024-03-01", "2024-03-02"]
        );
    }

    #[test]
    fn completion_for_missing_habit_reports_parent_missing() {
        let db = test_support::db();
        let id = test_support::user(&db, "mara");
        assert_eq!(
            db.add_completion(404, id, "2024-03-01").unwrap(),
            InsertOutcome::ParentMissing
        );
    }
}
