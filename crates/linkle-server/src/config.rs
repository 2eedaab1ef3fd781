//! Server configuration loaded from environment variables.
//!
//! All settings have defaults so the server can start with zero
//! configuration on a developer machine.

use std::net::SocketAddr;
use std::time::Duration;

use linkle_client::ClientConfig;
use linkle_shared::constants::{DEFAULT_HTTP_PORT, FEED_CACHE_SECS};

/// Public origin used when nothing is configured.
pub const DEFAULT_SITE_URL: &str = "https://linkle-steel.vercel.app";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `127.0.0.1:8080`
    pub http_addr: SocketAddr,

    /// Public origin written into `sitemap.xml`, without a trailing slash.
    /// Env: `SITE_URL`
    /// Default: [`DEFAULT_SITE_URL`]
    pub site_url: String,

    /// How long a fetched blog feed is served from memory.
    /// Env: `FEED_CACHE_SECS`
    /// Default: 600
    pub feed_cache_ttl: Duration,

    /// Database location, feed account and seed catalog.
    pub client: ClientConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([127, 0, 0, 1], DEFAULT_HTTP_PORT).into(),
            site_url: DEFAULT_SITE_URL.to_string(),
            feed_cache_ttl: Duration::from_secs(FEED_CACHE_SECS),
            client: ClientConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            client: ClientConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.trim().parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(url) = lookup("SITE_URL") {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                config.site_url = url.to_string();
            }
        }

        if let Some(val) = lookup("FEED_CACHE_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) => config.feed_cache_ttl = Duration::from_secs(secs),
                Err(_) => tracing::warn!(value = %val, "Invalid FEED_CACHE_SECS, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}
