//! Organizer pages: hosted listings, stats, follow state and guest reviews.
//!
//! Pages are addressed by slug (`"mika-sato"`); listings belong to an
//! organizer when the host name matches the slug's display name ignoring
//! case.

use chrono::Utc;
use linkle_shared::avatar::initial_avatar;
use linkle_shared::organizer::{
    self, display_name_from_slug, follow_key, slug_for_name, NewReview, OrganizerStats, Review,
    ReviewOrder,
};
use linkle_shared::query::OrganizerQuery;
use linkle_shared::Listing;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ClientError;
use crate::events::StoreKey;
use crate::state::AppState;

/// Header block of an organizer page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerProfile {
    pub slug: String,
    pub name: String,
    pub avatar_url: String,
    pub stats: OrganizerStats,
    pub following: bool,
    pub average_rating: f64,
    pub review_count: usize,
}

/// `"Mika-Sato"` and `"mika--sato"` both address `"mika-sato"`.
fn canonical_slug(slug: &str) -> String {
    slug_for_name(&display_name_from_slug(slug))
}

impl AppState {
    fn hosted_by(&self, slug: &str) -> Vec<Listing> {
        let name = display_name_from_slug(slug).to_lowercase();
        self.get_all_listings()
            .into_iter()
            .filter(|l| l.host.name.trim().to_lowercase() == name)
            .collect()
    }

    pub fn organizer_listings(&self, slug: &str, query: &OrganizerQuery) -> Vec<Listing> {
        query.apply(&self.hosted_by(slug))
    }

    pub fn organizer_stats(&self, slug: &str) -> OrganizerStats {
        OrganizerStats::from_listings(&self.hosted_by(slug))
    }

    pub fn organizer_profile(&self, slug: &str) -> OrganizerProfile {
        let hosted = self.hosted_by(slug);
        let name = display_name_from_slug(slug);
        let avatar_url = hosted
            .iter()
            .find_map(|l| l.host.avatar_url.clone())
            .unwrap_or_else(|| initial_avatar(&name));
        let reviews = self.reviews(slug, ReviewOrder::Newest);

        OrganizerProfile {
            slug: canonical_slug(slug),
            stats: OrganizerStats::from_listings(&hosted),
            following: self.is_following(slug),
            average_rating: organizer::average_rating(&reviews),
            review_count: reviews.len(),
            avatar_url,
            name,
        }
    }

    pub fn is_following(&self, slug: &str) -> bool {
        let key = follow_key(&display_name_from_slug(slug));
        self.database.is_following(&key).unwrap_or_else(|e| {
            warn!(organizer = %key, error = %e, "failed to read follow state");
            false
        })
    }

    /// Profiles of followed organizers, most recently followed first.
    pub fn followed_organizers(&self) -> Vec<OrganizerProfile> {
        let keys = self.database.list_followed().unwrap_or_else(|e| {
            warn!(error = %e, "failed to read followed organizers");
            Vec::new()
        });
        keys.iter()
            .map(|key| self.organizer_profile(&slug_for_name(key)))
            .collect()
    }

    /// Flip follow state and return the new value.
    pub fn toggle_follow(&mut self, slug: &str) -> bool {
        let key = follow_key(&display_name_from_slug(slug));
        let following = !self.is_following(slug);
        match self.database.set_following(&key, following) {
            Ok(()) => {
                info!(organizer = %key, following, "follow state changed");
                self.events.publish(StoreKey::Follows);
                following
            }
            Err(e) => {
                warn!(organizer = %key, error = %e, "failed to store follow state");
                !following
            }
        }
    }

    pub fn reviews(&self, slug: &str, order: ReviewOrder) -> Vec<Review> {
        let mut reviews = self
            .database
            .list_reviews(&canonical_slug(slug))
            .unwrap_or_else(|e| {
                warn!(organizer = slug, error = %e, "failed to read reviews");
                Vec::new()
            });
        organizer::sort_reviews(&mut reviews, order);
        reviews
    }

    pub fn submit_review(&mut self, slug: &str, input: NewReview) -> Result<Review, ClientError> {
        input.validate()?;
        let review = input.into_review(Utc::now().date_naive());
        self.database.insert_review(&canonical_slug(slug), &review)?;
        info!(organizer = slug, rating = review.rating, "review submitted");
        self.events.publish(StoreKey::Reviews);
        Ok(review)
    }

    /// Remove a reported review.
    pub fn report_review(&mut self, slug: &str, review_id: &str) -> bool {
        match self.database.delete_review(&canonical_slug(slug), review_id) {
            Ok(removed) => {
                if removed {
                    self.events.publish(StoreKey::Reviews);
                }
                removed
            }
            Err(e) => {
                warn!(organizer = slug, error = %e, "failed to remove review");
                false
            }
        }
    }

    pub fn average_rating(&self, slug: &str) -> f64 {
        organizer::average_rating(&self.reviews(slug, ReviewOrder::Newest))
    }
}
