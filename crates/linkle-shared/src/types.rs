use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

// Listing ids are millisecond timestamps rendered as decimal strings, so
// lexical order of same-length ids follows creation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ListingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct NotificationId(pub String);

impl NotificationId {
    /// Random part followed by the current time, both base36.
    pub fn generate() -> Self {
        let random: u64 = rand::random();
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        Self(format!("{}{}", to_base36(random), to_base36(millis)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sports,
    Learning,
    Hobby,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sports => "sports",
            Self::Learning => "learning",
            Self::Hobby => "hobby",
        }
    }

    /// Label shown in the Japanese UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sports => "スポーツ",
            Self::Learning => "学習",
            Self::Hobby => "趣味",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseError;

    // Accepts the wire names and the UI labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sports" | "スポーツ" => Ok(Self::Sports),
            "learning" | "学習" => Ok(Self::Learning),
            "hobby" | "趣味" => Ok(Self::Hobby),
            other => Err(ParseError::Category(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    Free,
    Paid,
}

impl FeeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Free => "無料",
            Self::Paid => "有料",
        }
    }
}

impl fmt::Display for FeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeeType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "free" | "無料" => Ok(Self::Free),
            "paid" | "有料" => Ok(Self::Paid),
            other => Err(ParseError::FeeType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_wire_names_and_labels() {
        assert_eq!("sports".parse::<Category>().unwrap(), Category::Sports);
        assert_eq!("学習".parse::<Category>().unwrap(), Category::Learning);
        assert!("cooking".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Hobby).unwrap();
        assert_eq!(json, "\"hobby\"");
    }

    #[test]
    fn notification_ids_are_distinct() {
        let a = NotificationId::generate();
        let b = NotificationId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn listing_id_from_millis() {
        let id = ListingId::from_millis(1_725_000_000_123);
        assert_eq!(id.as_str(), "1725000000123");
    }

    #[test]
    fn base36_encodes_zero_and_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
