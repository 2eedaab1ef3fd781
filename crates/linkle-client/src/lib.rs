//! # linkle-client
//!
//! Application layer of Linkle.  [`AppState`] owns the local database, the
//! seed catalog, the current session and the store-change event bus; the
//! `commands` modules implement every user-facing operation as methods on it.

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod feed;
pub mod map;
pub mod seed;
pub mod session;
pub mod state;

use tracing_subscriber::{fmt, EnvFilter};

pub use commands::membership::JoinOutcome;
pub use config::ClientConfig;
pub use error::ClientError;
pub use events::{EventBus, StoreEvent, StoreKey};
pub use session::{AuthStatus, Session};
pub use state::AppState;

/// Default `RUST_LOG`-style filter for embedders that do not set one.
pub const DEFAULT_LOG_FILTER: &str = "linkle_client=debug,linkle_store=info,warn";

/// Install a global `fmt` subscriber honouring `RUST_LOG`, falling back to
/// `default_filter`.  Safe to call more than once; later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
