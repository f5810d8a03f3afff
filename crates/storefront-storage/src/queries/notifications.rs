// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled notifications with at-most-once hand-off.

use rusqlite::{params, Row};
use storefront_core::{Notification, StorefrontError};

use crate::database::{map_tr_err, Database};

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        text: row.get(2)?,
        send_at: row.get(3)?,
    })
}

/// Schedule `text` for `chat_id` at `send_at`. Returns the notification id.
pub async fn schedule_notification(
    db: &Database,
    chat_id: i64,
    text: &str,
    send_at: &str,
) -> Result<i64, StorefrontError> {
    let text = text.to_string();
    let send_at = send_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO notifications (chat_id, text, send_at) VALUES (?1, ?2, ?3)",
                params![chat_id, text, send_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Take every unsent notification due at `now`.
///
/// Selection and the `sent = 1` flag are committed in one transaction, so a
/// notification is handed out at most once even if delivery later fails.
pub async fn fetch_due_notifications(
    db: &Database,
    now: &str,
) -> Result<Vec<Notification>, StorefrontError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let due = {
                let mut stmt = tx.prepare(
                    "SELECT id, chat_id, text, send_at FROM notifications
                     WHERE sent = 0 AND send_at <= ?1
                     ORDER BY send_at, id",
                )?;
                let rows = stmt.query_map(params![now], notification_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            };
            {
                let mut mark = tx.prepare("UPDATE notifications SET sent = 1 WHERE id = ?1")?;
                for n in &due {
                    mark.execute(params![n.id])?;
                }
            }
            tx.commit()?;
            Ok(due)
        })
        .await
        .map_err(map_tr_err)
}

/// Unsent notifications, soonest first.
pub async fn list_pending_notifications(
    db: &Database,
) -> Result<Vec<Notification>, StorefrontError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, chat_id, text, send_at FROM notifications
                 WHERE sent = 0 ORDER BY send_at, id",
            )?;
            let rows = stmt.query_map([], notification_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
