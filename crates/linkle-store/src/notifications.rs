//! Organizer inbox persistence.
//!
//! Notifications are an append-only log ordered by `seq`; the newest entry
//! has the highest `seq` and is listed first.  Each row also stores the
//! normalized host key so per-organizer queries stay index-backed.

use rusqlite::{params, Connection};

use linkle_shared::host_key;

use crate::database::{conversion_err, fmt_ts, not_found, parse_ts, Database};
use crate::error::Result;
use crate::models::{HostNotification, ListingId, NotificationId, NotificationStatus};

const NOTIFICATION_COLUMNS: &str =
    "id, host_name, listing_id, listing_title, created_at, applicant_name, status, kind";

impl Database {
    /// Append a notification to the log.
    pub fn insert_notification(&self, n: &HostNotification) -> Result<()> {
        insert_notification_row(self.conn(), n)
    }

    pub fn get_notification(&self, id: &NotificationId) -> Result<HostNotification> {
        self.conn()
            .query_row(
                &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1"),
                params![id.as_str()],
                row_to_notification,
            )
            .map_err(not_found)
    }

    /// Every notification for every host, newest first.
    pub fn list_notifications(&self) -> Result<Vec<HostNotification>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications ORDER BY seq DESC"
        ))?;
        let rows = stmt.query_map([], row_to_notification)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Notifications addressed to `host_name` (compared by [`host_key`]),
    /// newest first.
    pub fn notifications_for_host(&self, host_name: &str) -> Result<Vec<HostNotification>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE host_key = ?1
             ORDER BY seq DESC"
        ))?;
        let rows = stmt.query_map(params![host_key(host_name)], row_to_notification)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn unread_count_for_host(&self, host_name: &str) -> Result<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM notifications WHERE host_key = ?1 AND status = ?2",
            params![host_key(host_name), NotificationStatus::Unread.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Mark one notification read.  Returns `false` if the id is unknown.
    pub fn mark_notification_read(&self, id: &NotificationId) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE notifications SET status = ?1 WHERE id = ?2",
            params![NotificationStatus::Read.as_str(), id.as_str()],
        )?;
        Ok(affected > 0)
    }

    /// Mark every unread notification of `host_name` read in a single
    /// statement.  Returns how many changed.
    pub fn mark_all_read_for_host(&self, host_name: &str) -> Result<usize> {
        let affected = self.conn().execute(
            "UPDATE notifications SET status = ?1 WHERE host_key = ?2 AND status = ?3",
            params![
                NotificationStatus::Read.as_str(),
                host_key(host_name),
                NotificationStatus::Unread.as_str(),
            ],
        )?;
        tracing::debug!(host = host_name, affected, "inbox marked read");
        Ok(affected)
    }

    pub fn delete_notification(&self, id: &NotificationId) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM notifications WHERE id = ?1", params![id.as_str()])?;
        Ok(affected > 0)
    }
}

/// Runs on a plain connection or inside a caller's transaction.
pub(crate) fn insert_notification_row(conn: &Connection, n: &HostNotification) -> Result<()> {
    conn.execute(
        "INSERT INTO notifications
            (id, host_name, host_key, listing_id, listing_title, created_at,
             applicant_name, status, kind)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            n.id.as_str(),
            n.host_name,
            host_key(&n.host_name),
            n.listing_id.as_str(),
            n.listing_title,
            fmt_ts(&n.when),
            n.applicant_name,
            n.status.as_str(),
            n.kind.as_str(),
        ],
    )?;
    Ok(())
}

pub(crate) fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<HostNotification> {
    let id: String = row.get(0)?;
    let host_name: String = row.get(1)?;
    let listing_id: String = row.get(2)?;
    let listing_title: String = row.get(3)?;
    let created_str: String = row.get(4)?;
    let applicant_name: Option<String> = row.get(5)?;
    let status_str: String = row.get(6)?;
    let kind_str: String = row.get(7)?;

    let when = parse_ts(&created_str).map_err(|e| conversion_err(4, e))?;
    let status = status_str.parse().map_err(|e| conversion_err(6, e))?;
    let kind = kind_str.parse().map_err(|e| conversion_err(7, e))?;

    Ok(HostNotification {
        id: NotificationId(id),
        host_name,
        listing_id: ListingId(listing_id),
        listing_title,
        when,
        applicant_name,
        status,
        kind,
    })
}
