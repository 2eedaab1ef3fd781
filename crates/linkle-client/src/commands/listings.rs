use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use linkle_shared::avatar::initial_avatar;
use linkle_shared::constants::FALLBACK_NICKNAME;
use linkle_shared::query::{self, ListingQuery};
use linkle_shared::{HostRef, Listing, ListingId, NewListing};
use linkle_store::{MembershipSet, StoreError};
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::events::StoreKey;
use crate::state::AppState;

impl AppState {
    /// Seed and persisted listings merged by id (persisted wins), newest
    /// first.  Every returned listing has a usable host avatar.
    pub fn get_all_listings(&self) -> Vec<Listing> {
        let mut by_id: HashMap<ListingId, Listing> = self
            .seed
            .iter()
            .cloned()
            .map(|mut l| {
                l.ensure_avatar();
                (l.id.clone(), l)
            })
            .collect();

        for listing in self.persisted_listings() {
            by_id.insert(listing.id.clone(), listing);
        }

        let mut all: Vec<Listing> = by_id.into_values().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        all
    }

    /// Persisted record first, then the seed catalog.
    pub fn get_listing_by_id(&self, id: &ListingId) -> Option<Listing> {
        match self.database.get_listing(id) {
            Ok(mut listing) => {
                self.write_back_avatar(&mut listing);
                return Some(listing);
            }
            Err(StoreError::NotFound) => {}
            Err(e) => warn!(listing = %id, error = %e, "failed to read listing"),
        }

        self.seed.iter().find(|l| &l.id == id).cloned().map(|mut l| {
            l.ensure_avatar();
            l
        })
    }

    /// Create a listing hosted by the current profile and register it in
    /// `mine`.  Form validation is the caller's job (`NewListing::validate`).
    pub fn create_listing(&mut self, input: NewListing) -> Result<ListingId, ClientError> {
        let settings = self.settings();
        let nickname = settings.nickname().unwrap_or(FALLBACK_NICKNAME).to_string();
        let avatar_url = settings
            .avatar_url()
            .map(str::to_string)
            .unwrap_or_else(|| initial_avatar(&nickname));

        let now = Utc::now();
        let id = self.next_listing_id(now.timestamp_millis())?;
        let host = HostRef {
            name: nickname,
            avatar_url: Some(avatar_url),
        };
        let listing = input.into_listing(id.clone(), host, settings.bio(), now);

        self.database.insert_owned_listing(&listing)?;
        info!(listing = %id, host = %listing.host.name, "listing created");

        self.events.publish(StoreKey::Listings);
        self.events.publish(StoreKey::Mine);
        Ok(id)
    }

    /// Delete one of the user's own listings.  Refused while signed out or
    /// for ids outside `mine`.
    pub fn delete_listing_by_id(&mut self, id: &ListingId) -> bool {
        if !self.is_authenticated() {
            debug!(listing = %id, "delete refused: not signed in");
            return false;
        }

        match self.database.is_member(MembershipSet::Mine, id) {
            Ok(true) => {}
            Ok(false) => {
                debug!(listing = %id, "delete refused: not owned");
                return false;
            }
            Err(e) => {
                warn!(listing = %id, error = %e, "failed to check ownership");
                return false;
            }
        }

        match self.database.delete_listing_everywhere(id) {
            Ok(removed) => {
                info!(listing = %id, removed, "listing deleted");
                self.publish_listing_sets();
                removed
            }
            Err(e) => {
                warn!(listing = %id, error = %e, "failed to delete listing");
                false
            }
        }
    }

    /// Delete every listing in `mine`.  Returns how many were removed.
    pub fn delete_all_my_listings(&mut self) -> usize {
        match self.database.delete_owned_listings() {
            Ok(removed) => {
                info!(removed, "own listings deleted");
                self.publish_listing_sets();
                removed
            }
            Err(e) => {
                warn!(error = %e, "failed to delete own listings");
                0
            }
        }
    }

    /// Up to `limit` listings sharing a category or tag with `id`.  For an
    /// unknown id, the first `limit` listings.
    pub fn get_similar_listings(&self, id: &ListingId, limit: usize) -> Vec<Listing> {
        let all = self.get_all_listings();
        match self.get_listing_by_id(id) {
            Some(target) => query::similar(&all, &target, limit),
            None => all.into_iter().filter(|l| &l.id != id).take(limit).collect(),
        }
    }

    pub fn browse(&self, query: &ListingQuery, today: NaiveDate) -> Vec<Listing> {
        query.apply(&self.get_all_listings(), today)
    }

    /// The `n` most viewed listings.
    pub fn ranking(&self, n: usize) -> Vec<Listing> {
        query::ranking(&self.get_all_listings(), n)
    }

    fn persisted_listings(&self) -> Vec<Listing> {
        let mut listings = match self.database.list_listings() {
            Ok(listings) => listings,
            Err(e) => {
                warn!(error = %e, "failed to read listings");
                return Vec::new();
            }
        };
        for listing in &mut listings {
            self.write_back_avatar(listing);
        }
        listings
    }

    fn write_back_avatar(&self, listing: &mut Listing) {
        if !listing.ensure_avatar() {
            return;
        }
        if let Err(e) = self.database.upsert_listing(listing) {
            warn!(listing = %listing.id, error = %e, "failed to store avatar fallback");
        }
    }

    /// Millisecond timestamp id, bumped until it collides with neither a
    /// persisted nor a seed listing.
    fn next_listing_id(&self, mut millis: i64) -> Result<ListingId, ClientError> {
        loop {
            let id = ListingId::from_millis(millis);
            if !self.database.listing_exists(&id)? && !self.seed.iter().any(|l| l.id == id) {
                return Ok(id);
            }
            millis += 1;
        }
    }

    fn publish_listing_sets(&self) {
        self.events.publish(StoreKey::Listings);
        for set in MembershipSet::ALL {
            self.events.publish(StoreKey::for_set(set));
        }
    }
}
