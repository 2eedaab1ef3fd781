//! Account settings, stored as one JSON document in `app_settings`.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::models::UserSettings;

impl Database {
    /// Load the stored settings document.  `None` if nothing has been saved.
    ///
    /// Fields missing from an older document take their defaults.
    pub fn load_settings(&self) -> Result<Option<UserSettings>> {
        let json: Option<String> = self
            .conn()
            .query_row("SELECT json FROM app_settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Replace the stored settings document.
    pub fn save_settings(&self, settings: &UserSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO app_settings (id, json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }
}
