//! Client configuration from environment variables.

use std::path::PathBuf;

use linkle_store::database::DB_FILE_NAME;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Explicit database file.  Takes precedence over `data_dir`.
    pub db_path: Option<PathBuf>,
    /// Directory holding `linkle.db`.  `None` uses the platform data dir.
    pub data_dir: Option<PathBuf>,
    /// note.com account whose RSS feed is proxied.  `None` disables the feed.
    pub note_username: Option<String>,
    /// Load the built-in demo listings as the seed catalog.
    pub seed_demo: bool,
}

impl ClientConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup, so tests do not have
    /// to touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let seed_demo = match non_empty("LINKLE_SEED_DEMO") {
            None => false,
            Some(v) => match parse_bool(&v) {
                Some(b) => b,
                None => {
                    tracing::warn!(value = %v, "invalid LINKLE_SEED_DEMO, using false");
                    false
                }
            },
        };

        Self {
            db_path: non_empty("LINKLE_DB_PATH").map(PathBuf::from),
            data_dir: non_empty("LINKLE_DATA_DIR").map(PathBuf::from),
            note_username: non_empty("NOTE_USERNAME"),
            seed_demo,
        }
    }

    /// The database file to open, if configured explicitly.
    pub fn resolved_db_path(&self) -> Option<PathBuf> {
        self.db_path
            .clone()
            .or_else(|| self.data_dir.as_ref().map(|d| d.join(DB_FILE_NAME)))
    }

    /// RSS URL of the configured note.com account.
    pub fn feed_url(&self) -> Option<String> {
        self.note_username
            .as_deref()
            .map(|user| format!("https://note.com/{user}/rss"))
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
