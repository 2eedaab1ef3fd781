use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::database::{fmt_ts, Database};
use crate::error::Result;
use crate::listings::{listing_params, LISTING_COLUMNS};
use crate::notifications::insert_notification_row;
use crate::models::{HostNotification, Listing, ListingId, MembershipSet, UserSettings};

/// Everything stored on this device, as one JSON-serializable document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// RFC-3339 timestamp of when the snapshot was taken
    pub created_at: String,
    /// App version that produced the snapshot
    pub version: String,
    pub listings: Vec<Listing>,
    /// Newest first, as the inbox lists them.
    pub notifications: Vec<HostNotification>,
    pub memberships: SnapshotMemberships,
    #[serde(default)]
    pub settings: Option<UserSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotMemberships {
    #[serde(default)]
    pub joined: Vec<ListingId>,
    #[serde(default)]
    pub favs: Vec<ListingId>,
    #[serde(default)]
    pub mine: Vec<ListingId>,
}

impl SnapshotMemberships {
    fn set(&self, set: MembershipSet) -> &[ListingId] {
        match set {
            MembershipSet::Joined => &self.joined,
            MembershipSet::Favs => &self.favs,
            MembershipSet::Mine => &self.mine,
        }
    }
}

impl Database {
    pub fn export_snapshot(&self) -> Result<Snapshot> {
        let memberships = SnapshotMemberships {
            joined: self.members(MembershipSet::Joined)?,
            favs: self.members(MembershipSet::Favs)?,
            mine: self.members(MembershipSet::Mine)?,
        };

        Ok(Snapshot {
            created_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            listings: self.list_listings()?,
            notifications: self.list_notifications()?,
            memberships,
            settings: self.load_settings()?,
        })
    }

    /// Merge a snapshot into this database in one transaction.  Existing
    /// rows win (INSERT OR IGNORE); settings are only taken when none are
    /// stored yet.  Any other failure leaves the database untouched.
    pub fn import_snapshot(&mut self, snapshot: &Snapshot) -> Result<ImportStats> {
        let mut stats = ImportStats::default();
        let tx = self.conn_mut().transaction()?;

        for listing in &snapshot.listings {
            let inserted = tx.execute(
                &format!(
                    "INSERT OR IGNORE INTO listings ({LISTING_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
                ),
                params_from_iter(listing_params(listing)?.iter()),
            )?;
            stats.listings_imported += inserted;
        }

        // Oldest first so the log keeps its order.
        for n in snapshot.notifications.iter().rev() {
            let exists = tx
                .query_row(
                    "SELECT 1 FROM notifications WHERE id = ?1",
                    params![n.id.as_str()],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if exists {
                continue;
            }
            insert_notification_row(&tx, n)?;
            stats.notifications_imported += 1;
        }

        let now = fmt_ts(&Utc::now());
        for set in MembershipSet::ALL {
            for id in snapshot.memberships.set(set).iter().rev() {
                stats.memberships_imported += tx.execute(
                    "INSERT OR IGNORE INTO memberships (set_name, listing_id, added_at)
                     VALUES (?1, ?2, ?3)",
                    params![set.as_str(), id.as_str(), now],
                )?;
            }
        }

        if let Some(settings) = &snapshot.settings {
            let json = serde_json::to_string(settings)?;
            stats.settings_imported = tx.execute(
                "INSERT OR IGNORE INTO app_settings (id, json) VALUES (1, ?1)",
                params![json],
            )? == 1;
        }

        tx.commit()?;

        tracing::info!(
            listings = stats.listings_imported,
            notifications = stats.notifications_imported,
            memberships = stats.memberships_imported,
            "snapshot imported"
        );
        Ok(stats)
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub listings_imported: usize,
    pub notifications_imported: usize,
    pub memberships_imported: usize,
    pub settings_imported: bool,
}
