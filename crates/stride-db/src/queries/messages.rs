use anyhow::Result;

use super::OptionalExt;
use crate::models::MessageRow;
use crate::{Database, TxOutcome};

impl Database {
    // -- Motivational messages --

    /// Picks a random message not yet served today and stamps it, in one
    /// transaction so two callers cannot draw the same message. `None` once
    /// every message has been used today.
    pub fn next_motivation_message(&self) -> Result<Option<MessageRow>> {
        self.with_tx(|tx| {
            let row = tx
                .query_row(
                    "SELECT message_id, message_text, message_author
                     FROM motivation_messages
                     WHERE last_used_on IS NULL OR last_used_on < date('now')
                     ORDER BY RANDOM() LIMIT 1",
                    [],
                    |row| {
                        Ok(MessageRow {
                            message_id: row.get(0)?,
                            message_text: row.get(1)?,
                            message_author: row.get(2)?,
                        })
                    },
                )
                .optional()?;

            match row {
                Some(msg) => {
                    tx.execute(
                        "UPDATE motivation_messages SET last_used_on = date('now')
                         WHERE message_id = ?1",
                        [msg.message_id],
                    )?;
                    Ok(TxOutcome::Commit(Some(msg)))
                }
                None => Ok(TxOutcome::Commit(None)),
            }
        })
    }
}
