//! Store-change notifications.
//!
//! Every mutating operation publishes the key of the store it touched so
//! open views can re-read.  Delivery is best effort: events published with no
//! subscriber, or missed by a lagging one, are dropped.

use chrono::{DateTime, Utc};
use linkle_store::MembershipSet;
use serde::Serialize;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest are dropped.
pub const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreKey {
    Listings,
    Joined,
    Favs,
    Mine,
    Notifications,
    Settings,
    Follows,
    Reviews,
    Session,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listings => "listings",
            Self::Joined => "joined",
            Self::Favs => "favs",
            Self::Mine => "mine",
            Self::Notifications => "notifications",
            Self::Settings => "settings",
            Self::Follows => "follows",
            Self::Reviews => "reviews",
            Self::Session => "session",
        }
    }

    pub fn for_set(set: MembershipSet) -> Self {
        match set {
            MembershipSet::Joined => Self::Joined,
            MembershipSet::Favs => Self::Favs,
            MembershipSet::Mine => Self::Mine,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreEvent {
    pub key: StoreKey,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, key: StoreKey) {
        let event = StoreEvent { key, at: Utc::now() };
        if self.tx.send(event).is_err() {
            tracing::trace!(key = key.as_str(), "no event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_BUFFER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_receive_published_keys() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(StoreKey::Favs);
        bus.publish(StoreKey::Notifications);

        assert_eq!(rx.try_recv().unwrap().key, StoreKey::Favs);
        assert_eq!(rx.try_recv().unwrap().key, StoreKey::Notifications);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        EventBus::default().publish(StoreKey::Listings);
    }

    #[test]
    fn keys_serialize_as_store_names() {
        let json = serde_json::to_string(&StoreKey::for_set(MembershipSet::Favs)).unwrap();
        assert_eq!(json, "\"favs\"");
    }
}
