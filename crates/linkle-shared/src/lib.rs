//! # linkle-shared
//!
//! Domain types shared by every Linkle crate: listings, host notifications,
//! account settings, organizer reviews, plus the pure filtering and
//! normalization helpers that operate on them.  Nothing in here touches
//! storage or the network.

pub mod avatar;
pub mod constants;
pub mod error;
pub mod inbox;
pub mod listing;
pub mod organizer;
pub mod query;
pub mod settings;
pub mod types;

pub use error::{ParseError, ValidationError};
pub use inbox::{host_key, HostNotification, NewNotification, NotificationKind, NotificationStatus};
pub use listing::{HostRef, Listing, NewListing};
pub use settings::UserSettings;
pub use types::{Category, FeeType, ListingId, NotificationId};
