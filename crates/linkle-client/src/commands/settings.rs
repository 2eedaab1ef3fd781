use linkle_shared::UserSettings;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ClientError;
use crate::events::StoreKey;
use crate::state::AppState;

impl AppState {
    /// Stored settings, or the defaults when none are stored or the stored
    /// document is unreadable.
    pub fn settings(&self) -> UserSettings {
        match self.database.load_settings() {
            Ok(Some(settings)) => settings,
            Ok(None) => UserSettings::default(),
            Err(e) => {
                warn!(error = %e, "failed to read settings, using defaults");
                UserSettings::default()
            }
        }
    }

    /// Validate and store a full settings document.
    pub fn save_settings(&mut self, settings: UserSettings) -> Result<(), ClientError> {
        settings.validate()?;
        self.database.save_settings(&settings)?;
        info!(nickname = %settings.nickname, "settings saved");
        self.events.publish(StoreKey::Settings);
        Ok(())
    }

    /// Merge a partial camelCase JSON object over the current settings,
    /// validate and store the result.
    pub fn update_settings(&mut self, patch: Value) -> Result<UserSettings, ClientError> {
        let mut merged = serde_json::to_value(self.settings())?;
        if let (Value::Object(base), Value::Object(patch)) = (&mut merged, patch) {
            for (key, value) in patch {
                base.insert(key, value);
            }
        }
        let settings: UserSettings = serde_json::from_value(merged)?;
        self.save_settings(settings.clone())?;
        Ok(settings)
    }
}
