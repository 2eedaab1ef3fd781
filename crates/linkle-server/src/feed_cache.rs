//! In-memory cache in front of the blog feed.
//!
//! A fetched feed is served for `ttl` before the next request refetches it.
//! Empty results (feed down, feed disabled) are not cached, so recovery is
//! picked up on the following request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use linkle_client::feed::{self, FeedEntry};
use linkle_shared::constants::FEED_MAX_ITEMS;
use tokio::sync::RwLock;
use tracing::debug;

// ---------------------------------------------------------------------------
// Cached entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CachedFeed {
    entries: Vec<FeedEntry>,
    fetched_at: Instant,
}

impl CachedFeed {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

// ---------------------------------------------------------------------------
// Feed cache
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FeedCache {
    /// RSS URL, `None` when no note.com account is configured.
    url: Option<String>,
    ttl: Duration,
    http: reqwest::Client,
    cached: Arc<RwLock<Option<CachedFeed>>>,
}

impl FeedCache {
    pub fn new(url: Option<String>, ttl: Duration, http: reqwest::Client) -> Self {
        Self {
            url,
            ttl,
            http,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Latest entries, from memory while fresh.
    pub async fn latest(&self) -> Vec<FeedEntry> {
        let Some(url) = self.url.as_deref() else {
            return Vec::new();
        };

        {
            let cached = self.cached.read().await;
            if let Some(feed) = cached.as_ref().filter(|f| f.is_fresh(self.ttl)) {
                debug!(count = feed.entries.len(), "Feed served from cache");
                return feed.entries.clone();
            }
        }

        let entries = feed::fetch_latest(&self.http, url, FEED_MAX_ITEMS).await;
        if !entries.is_empty() {
            let mut cached = self.cached.write().await;
            *cached = Some(CachedFeed {
                entries: entries.clone(),
                fetched_at: Instant::now(),
            });
        }
        entries
    }

    #[cfg(test)]
    async fn prime(&self, entries: Vec<FeedEntry>) {
        *self.cached.write().await = Some(CachedFeed {
            entries,
            fetched_at: Instant::now(),
        });
    }
}
