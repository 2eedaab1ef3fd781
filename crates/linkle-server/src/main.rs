//! # linkle-server
//!
//! Local HTTP facade over the Linkle device store.
//!
//! This binary provides:
//! - **REST API** (axum) for listings, membership sets, the organizer inbox,
//!   settings, session hand-over and organizer pages
//! - **Server-sent events** carrying store-change keys so open views re-read
//! - **Blog feed proxy** with an in-memory cache
//! - **sitemap.xml** for the public pages

mod api;
mod config;
mod error;
mod feed_cache;
mod sitemap;

use linkle_client::AppState;
use linkle_shared::constants::APP_NAME;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::ApiState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,linkle_server=debug")),
        )
        .init();

    info!("Starting {} server v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the device store
    // -----------------------------------------------------------------------
    let app = AppState::open(&config.client)?;
    info!(
        seed = app.seed().len(),
        feed = config.client.note_username.is_some(),
        "Store opened"
    );

    let http_addr = config.http_addr;
    let state = ApiState::new(app, config);

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
