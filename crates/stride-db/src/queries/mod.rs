//! Store operations, grouped by entity. Every method runs on the shared
//! connection through `Database::with_conn`, `with_conn_mut`, or `with_tx`.

mod comments;
mod habits;
mod likes;
mod messages;
mod posts;
mod reflections;
mod users;

use anyhow::Result;
use rusqlite::ffi;

pub use users::UpdateOutcome;

/// Outcome of an insert guarded by a uniqueness or parent-row rule. The
/// guard reports a duplicate as a value, never as a generic failure, so
/// callers can map it deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// An equivalent row already exists; nothing was written.
    AlreadyExists,
    /// A referenced parent row is gone; nothing was written.
    ParentMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstraintKind {
    Unique,
    ForeignKey,
}

/// Classifies a failed statement against SQLite's extended result codes so
/// constraint hits can be told apart from real store failures.
fn constraint_kind(err: &rusqlite::Error) -> Option<ConstraintKind> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => match e.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                Some(ConstraintKind::Unique)
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintKind::ForeignKey),
            _ => None,
        },
        _ => None,
    }
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
