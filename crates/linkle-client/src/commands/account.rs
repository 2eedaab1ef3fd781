//! Whole-account operations: erase local data, snapshot export and import.

use linkle_store::{ImportStats, Snapshot};
use tracing::info;

use crate::error::ClientError;
use crate::events::StoreKey;
use crate::state::AppState;

const ALL_KEYS: [StoreKey; 8] = [
    StoreKey::Listings,
    StoreKey::Joined,
    StoreKey::Favs,
    StoreKey::Mine,
    StoreKey::Notifications,
    StoreKey::Settings,
    StoreKey::Follows,
    StoreKey::Reviews,
];

impl AppState {
    /// Erase everything stored on this device and sign out.
    pub fn delete_account(&mut self) -> Result<(), ClientError> {
        self.database.clear_all()?;
        self.sign_out();
        for key in ALL_KEYS {
            self.events.publish(key);
        }
        info!("account deleted");
        Ok(())
    }

    pub fn export_snapshot(&self) -> Result<Snapshot, ClientError> {
        Ok(self.database.export_snapshot()?)
    }

    /// Merge a snapshot; rows already present are kept.
    pub fn import_snapshot(&mut self, snapshot: &Snapshot) -> Result<ImportStats, ClientError> {
        let stats = self.database.import_snapshot(snapshot)?;
        for key in ALL_KEYS {
            self.events.publish(key);
        }
        Ok(stats)
    }
}
