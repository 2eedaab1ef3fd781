//! Records persisted in the local database.
//!
//! Listings, notifications, settings and reviews are defined in
//! `linkle-shared` and re-exported here; the membership set selector is the
//! only store-specific model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use linkle_shared::inbox::{HostNotification, NotificationKind, NotificationStatus};
pub use linkle_shared::listing::{HostRef, Listing};
pub use linkle_shared::organizer::Review;
pub use linkle_shared::settings::UserSettings;
pub use linkle_shared::types::{Category, FeeType, ListingId, NotificationId};

/// One of the per-device listing id sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipSet {
    /// Listings the user joined.
    Joined,
    /// Listings the user favorited.
    Favs,
    /// Listings the user created.
    Mine,
}

impl MembershipSet {
    pub const ALL: [MembershipSet; 3] = [Self::Joined, Self::Favs, Self::Mine];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joined => "joined",
            Self::Favs => "favs",
            Self::Mine => "mine",
        }
    }
}

impl fmt::Display for MembershipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown membership set: {0}")]
pub struct UnknownSet(pub String);

impl FromStr for MembershipSet {
    type Err = UnknownSet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joined" => Ok(Self::Joined),
            "favs" | "favorites" => Ok(Self::Favs),
            "mine" => Ok(Self::Mine),
            other => Err(UnknownSet(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_names_parse() {
        for set in MembershipSet::ALL {
            assert_eq!(set.as_str().parse::<MembershipSet>(), Ok(set));
        }
        assert_eq!("favorites".parse::<MembershipSet>(), Ok(MembershipSet::Favs));

        let err = "archive".parse::<MembershipSet>().unwrap_err();
        assert_eq!(err, UnknownSet("archive".into()));
        assert_eq!(err.to_string(), "unknown membership set: archive");
    }
}
