//! Organizer pages: slugs, hosted-listing stats and guest reviews.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_RATING, MIN_RATING};
use crate::error::ValidationError;
use crate::listing::Listing;

/// `"mika-sato"` -> `"Mika Sato"`.
pub fn display_name_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"Mika Sato"` -> `"mika-sato"`.
pub fn slug_for_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Key under which follow state is stored for an organizer.
pub fn follow_key(display_name: &str) -> String {
    display_name.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerStats {
    pub events: usize,
    pub total_capacity: u64,
    pub avg_views: u64,
}

impl OrganizerStats {
    pub fn from_listings(hosted: &[Listing]) -> Self {
        let events = hosted.len();
        let total_capacity = hosted.iter().map(|l| u64::from(l.capacity_left)).sum();
        let avg_views = if events == 0 {
            0
        } else {
            let total: u64 = hosted.iter().map(|l| l.views).sum();
            (total as f64 / events as f64).round() as u64
        };
        Self { events, total_capacity, avg_views }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author: String,
    pub rating: u8,
    pub comment: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub author: String,
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.author.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.comment.trim().is_empty() {
            return Err(ValidationError::MissingComment);
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::InvalidRating {
                got: self.rating,
                min: MIN_RATING,
                max: MAX_RATING,
            });
        }
        Ok(())
    }

    pub fn into_review(self, date: NaiveDate) -> Review {
        Review {
            id: Uuid::new_v4().to_string(),
            author: self.author.trim().to_string(),
            rating: self.rating,
            comment: self.comment.trim().to_string(),
            date,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewOrder {
    #[default]
    Newest,
    HighestRated,
}

pub fn sort_reviews(reviews: &mut [Review], order: ReviewOrder) {
    match order {
        ReviewOrder::Newest => reviews.sort_by(|a, b| b.date.cmp(&a.date)),
        ReviewOrder::HighestRated => {
            reviews.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| b.date.cmp(&a.date)))
        }
    }
}

/// Mean rating, `0.0` when there are no reviews.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    f64::from(sum) / reviews.len() as f64
}
