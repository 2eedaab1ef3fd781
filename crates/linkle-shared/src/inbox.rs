//! Organizer inbox records.
//!
//! A notification is addressed to an organizer by display name.  Names are
//! compared through [`host_key`], so `"Taro"`, `"Taro "` and the full-width
//! `"Ｔａｒｏ"` all reach the same inbox.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::ParseError;
use crate::types::{ListingId, NotificationId};

/// Matching key for organizer names: NFKC (folds full-width forms),
/// trimmed, lowercased.
pub fn host_key(name: &str) -> String {
    name.nfkc().collect::<String>().trim().to_lowercase()
}

/// Read state.  The only transition is `Unread -> Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Unread,
    Read,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            other => Err(ParseError::NotificationStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    JoinRequest,
    Message,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JoinRequest => "join-request",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "join-request" => Ok(Self::JoinRequest),
            "message" => Ok(Self::Message),
            other => Err(ParseError::NotificationKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostNotification {
    pub id: NotificationId,
    /// Organizer name as it was entered; match with [`host_key`].
    pub host_name: String,
    pub listing_id: ListingId,
    pub listing_title: String,
    pub when: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_name: Option<String>,
    pub status: NotificationStatus,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

impl HostNotification {
    pub fn is_unread(&self) -> bool {
        self.status == NotificationStatus::Unread
    }

    /// Whether this notification belongs to the inbox of `host_name`.
    pub fn is_for(&self, host_name: &str) -> bool {
        host_key(&self.host_name) == host_key(host_name)
    }

    /// Inbox search: listing title, applicant name and kind, case-insensitive.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {}",
            self.listing_title,
            self.applicant_name.as_deref().unwrap_or(""),
            self.kind
        )
        .to_lowercase();
        haystack.contains(&query)
    }
}

/// Caller-supplied part of a notification; id, timestamp and status are
/// assigned on push.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub host_name: String,
    pub listing_id: ListingId,
    pub listing_title: String,
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

impl NewNotification {
    pub fn into_notification(self, id: NotificationId, when: DateTime<Utc>) -> HostNotification {
        HostNotification {
            id,
            host_name: self.host_name,
            listing_id: self.listing_id,
            listing_title: self.listing_title,
            when,
            applicant_name: self.applicant_name,
            status: NotificationStatus::Unread,
            kind: self.kind,
        }
    }
}

/// Inbox page filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InboxFilter {
    /// `None` shows every kind.
    #[serde(default, rename = "type")]
    pub kind: Option<NotificationKind>,
    #[serde(default)]
    pub search: String,
}

impl InboxFilter {
    pub fn matches(&self, n: &HostNotification) -> bool {
        if let Some(kind) = self.kind {
            if n.kind != kind {
                return false;
            }
        }
        n.matches_search(&self.search)
    }
}
