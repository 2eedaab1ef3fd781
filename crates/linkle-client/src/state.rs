//! Application state shared by every operation.
//!
//! Embedders wrap [`AppState`] in `Arc<Mutex<>>`; operations take `&self` or
//! `&mut self` and run synchronously against the local database.

use linkle_shared::Listing;
use linkle_store::Database;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::EventBus;
use crate::seed;
use crate::session::AuthStatus;

pub struct AppState {
    /// Local SQLite database holding everything created on this device.
    pub database: Database,

    /// Session handed over by the external auth provider.
    pub(crate) auth: AuthStatus,

    /// Built-in listings shown alongside persisted ones.  Never mutated;
    /// changes to a seed listing are written to the database as an override.
    pub(crate) seed: Vec<Listing>,

    pub(crate) events: EventBus,
}

impl AppState {
    pub fn new(database: Database, seed: Vec<Listing>) -> Self {
        Self {
            database,
            auth: AuthStatus::Unauthenticated,
            seed,
            events: EventBus::default(),
        }
    }

    /// Open the configured database and seed catalog.
    pub fn open(config: &ClientConfig) -> Result<Self, ClientError> {
        let database = match config.resolved_db_path() {
            Some(path) => {
                tracing::info!(path = %path.display(), "opening database");
                Database::open_at(&path)?
            }
            None => Database::new()?,
        };

        let seed = if config.seed_demo {
            seed::demo_listings()
        } else {
            Vec::new()
        };
        tracing::info!(seed_listings = seed.len(), "application state ready");

        Ok(Self::new(database, seed))
    }

    /// Fresh state over a private in-memory database and no seed listings.
    pub fn in_memory() -> Result<Self, ClientError> {
        Ok(Self::new(Database::open_in_memory()?, Vec::new()))
    }

    pub fn seed(&self) -> &[Listing] {
        &self.seed
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}
