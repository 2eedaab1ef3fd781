//! Listings: the event/activity posts users browse, join and favorite.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::avatar;
use crate::constants::HOST_BIO_HEADING;
use crate::error::ValidationError;
use crate::types::{Category, FeeType, ListingId};

/// Organizer reference embedded in a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub category: Category,
    pub title: String,
    pub date: NaiveDate,
    pub place: String,
    pub capacity_left: u32,
    pub host: HostRef,
    pub image_url: String,
    pub fee_type: FeeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Replace a missing or broken host avatar with the initial-letter
    /// fallback.  Returns `true` when the record changed.
    pub fn ensure_avatar(&mut self) -> bool {
        if !avatar::needs_fallback(self.host.avatar_url.as_deref()) {
            return false;
        }
        if self.host.name.trim().is_empty() {
            self.host.name = crate::constants::FALLBACK_NICKNAME.to_string();
        }
        self.host.avatar_url = Some(avatar::initial_avatar(&self.host.name));
        true
    }

    /// Same category, or at least one tag in common.
    pub fn is_related_to(&self, other: &Listing) -> bool {
        self.category == other.category || self.tags.iter().any(|t| other.tags.contains(t))
    }

    /// The event starts at midnight UTC of its date.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// The event starts within `hours` from `now`, or only a handful of
    /// seats remain.
    pub fn is_closing_soon(&self, now: DateTime<Utc>, hours: i64, low_left: u32) -> bool {
        let start = self.starts_at();
        let within_hours = start >= now && start - now <= Duration::hours(hours);
        let low_capacity = self.capacity_left > 0 && self.capacity_left <= low_left;
        within_hours || low_capacity
    }

    /// Full, or the event date has passed.
    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.capacity_left == 0 || self.starts_at() < now
    }
}

/// Input for creating a listing.  The host and id are filled in by the
/// repository from the current profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub category: Category,
    pub title: String,
    pub date: NaiveDate,
    pub place: String,
    pub capacity: u32,
    pub fee_type: FeeType,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewListing {
    /// Form checks the creation page runs before submitting.  The store
    /// itself does not call this.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.place.trim().is_empty() {
            return Err(ValidationError::MissingPlace);
        }
        if self.capacity < 1 {
            return Err(ValidationError::InvalidCapacity);
        }
        Ok(())
    }

    /// Build the stored record.  A non-empty `host_bio` is appended to the
    /// description under [`HOST_BIO_HEADING`].
    pub fn into_listing(
        self,
        id: ListingId,
        host: HostRef,
        host_bio: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Listing {
        let mut description = self.description.unwrap_or_default();
        if let Some(bio) = host_bio.map(str::trim).filter(|b| !b.is_empty()) {
            description = if description.is_empty() {
                format!("{HOST_BIO_HEADING}\n{bio}")
            } else {
                format!("{description}\n\n{HOST_BIO_HEADING}\n{bio}")
            };
        }

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Listing {
            id,
            category: self.category,
            title: self.title,
            date: self.date,
            place: self.place,
            capacity_left: self.capacity,
            host,
            image_url: self
                .image_url
                .map(|u| u.trim().to_string())
                .unwrap_or_default(),
            fee_type: self.fee_type,
            description: Some(description).filter(|d| !d.is_empty()),
            tags,
            views: 0,
            created_at,
        }
    }
}
