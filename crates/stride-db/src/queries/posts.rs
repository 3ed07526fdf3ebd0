use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};

use super::OptionalExt;
use crate::models::PostRow;
use crate::{Database, TxOutcome};

const POST_SELECT: &str = "SELECT p.post_id, p.user_id, u.username, p.post_title,
            p.post_text, p.filename, p.media_type, p.filesize, p.created_at
     FROM posts p
     LEFT JOIN users u ON p.user_id = u.user_id";

impl Database {
    // -- Posts --

    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{POST_SELECT} ORDER BY p.created_at DESC, p.post_id DESC"
            ))?;
            let rows = stmt
                .query_map([], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_post(&self, post_id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, post_id))
    }

    pub fn create_post(
        &self,
        user_id: i64,
        title: &str,
        text: &str,
        filename: &str,
        media_type: &str,
        filesize: i64,
    ) -> Result<PostRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO posts (user_id, post_title, post_text, filename, media_type, filesize)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![user_id, title, text, filename, media_type, filesize],
            )?;
            let post_id = conn.last_insert_rowid();
            query_post(conn, post_id)?.ok_or_else(|| anyhow!("post {post_id} missing after insert"))
        })
    }

    /// Owner-filtered partial update; `false` when the row is missing or
    /// belongs to someone else.
    pub fn update_post(
        &self,
        post_id: i64,
        user_id: i64,
        title: Option<&str>,
        text: Option<&str>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let mut sets: Vec<&str> = Vec::new();
            let mut values: Vec<&dyn rusqlite::types::ToSql> = Vec::new();
            if let Some(ref v) = title {
                sets.push("post_title = ?");
                values.push(v);
            }
            if let Some(ref v) = text {
                sets.push("post_text = ?");
                values.push(v);
            }
            if sets.is_empty() {
                anyhow::bail!("update_post called with no fields");
            }
            let sql = format!(
                "UPDATE posts SET {} WHERE post_id = ? AND user_id = ?",
                sets.join(", ")
            );
            values.push(&post_id);
            values.push(&user_id);
            let updated = conn.execute(&sql, values.as_slice())?;
            Ok(updated > 0)
        })
    }

    /// Local half of a post deletion: likes, comments, then the post row
    /// filtered by owner, all in one transaction. A miss on the post row
    /// rolls the dependent deletes back and returns `false`.
    pub fn delete_post_owned(&self, post_id: i64, user_id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM likes WHERE post_id = ?1", [post_id])?;
            tx.execute("DELETE FROM comments WHERE post_id = ?1", [post_id])?;
            let deleted = tx.execute(
                "DELETE FROM posts WHERE post_id = ?1 AND user_id = ?2",
                params![post_id, user_id],
            )?;
            if deleted == 0 {
                return Ok(TxOutcome::Rollback(false));
            }
            Ok(TxOutcome::Commit(true))
        })
    }
}

pub(super) fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        post_id: row.get(0)?,
        user_id: row.get(1)?,
        username: row
            .get::<_, Option<String>>(2)?
            .unwrap_or_else(|| "unknown".to_string()),
        post_title: row.get(3)?,
        post_text: row.get(4)?,
        filename: row.get(5)?,
        media_type: row.get(6)?,
        filesize: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn query_post(conn: &Connection, post_id: i64) -> Result<Option<PostRow>> {
    let mut stmt = conn.prepare(&format!("{POST_SELECT} WHERE p.post_id = ?1"))?;
    let row = stmt.query_row([post_id], post_from_row).optional()?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::InsertOutcome;
    use crate::test_support;

    #[test]
    fn create_post_returns_the_stored_row_with_owner() {
        let db = test_support::db();
        let id = test_support::user(&db, "mara");
        let post = db
            .create_post(id, "First", "hello", "abc.jpg", "image/jpeg", 998)
            .unwrap();
        assert_eq!(post.user_id, id);
        assert_eq!(post.username, "mara");
        assert_eq!(post.filename, "abc.jpg");
        assert_eq!(post.filesize, 998);
    }

    #[test]
    fn posts_list_newest_first() {
        let db = test_support::db();
        let id = test_support::user(&db, "mara");
        test_support::post(&db, id, "one");
        test_support::post(&db, id, "two");
        test_support::post(&db, id, "three");
        let titles: Vec<String> = db
            .list_posts()
            .unwrap()
            .into_iter()
            .map(|p| p.post_title)
            .collect();
        assert_eq!(titles, vec!["three", "two", "one"]);
    }

    #[test]
    fn update_post_is_owner_filtered() {
        let db = test_support::db();
        let owner = test_support::user(&db, "mara");
        let stranger = test_support::user(&db, "noor");
        let post_id = test_support::post(&db, owner, "mine");

        assert!(!db.update_post(post_id, stranger, Some("stolen"), None).unwrap());
        assert!(db.update_post(post_id, owner, Some("renamed"), None).unwrap());
        assert_eq!(db.get_post(post_id).unwrap().unwrap().post_title, "renamed");
    }

    #[test]
    fn delete_post_removes_dependents_with_it() {
        let db = test_support::db();
        let owner = test_support::user(&db, "mara");
        let fan = test_support::user(&db, "noor");
        let post_id = test_support::post(&db, owner, "mine");
        assert_eq!(db.insert_like(post_id, fan).unwrap(), InsertOutcome::Created);
        db.create_comment(post_id, fan, "love it").unwrap().unwrap();

        assert!(db.delete_post_owned(post_id, owner).unwrap());

        assert!(db.get_post(post_id).unwrap().is_none());
        assert_eq!(db.like_count(post_id).unwrap(), 0);
        assert_eq!(db.comment_count(post_id).unwrap(), 0);
    }

    #[test]
    fn delete_by_non_owner_rolls_back_dependent_deletes() {
        let db = test_support::db();
        let owner = test_support::user(&db, "mara");
        let fan = test_support::user(&db, "noor");
        let post_id = test_support::post(&db, owner, "mine");
        assert_eq!(db.insert_like(post_id, fan).unwrap(), InsertOutcome::Created);
        db.create_comment(post_id, fan, "love it").unwrap().unwrap();

        assert!(!db.delete_post_owned(post_id, fan).unwrap());

        // The like and comment deletes were undone with the miss.
        assert!(db.get_post(post_id).unwrap().is_some());
        assert_eq!(db.like_count(post_id).unwrap(), 1);
        assert_eq!(db.comment_count(post_id).unwrap(), 1);
    }

    #[test]
    fn delete_of_missing_post_reports_false() {
        let db = test_support::db();
        let id = test_support::user(&db, "mara");
        assert!(!db.delete_post_owned(12345, id).unwrap());
    }
}
