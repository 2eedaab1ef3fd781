//! Joined / favorite / own listing sets and the join flow.

use chrono::Utc;
use linkle_shared::{
    Listing, ListingId, NewNotification, NotificationId, NotificationKind, ValidationError,
};
use linkle_shared::inbox::HostNotification;
use linkle_store::MembershipSet;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ClientError;
use crate::events::StoreKey;
use crate::state::AppState;

/// Result of [`AppState::join_listing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum JoinOutcome {
    Joined {
        #[serde(rename = "capacityLeft")]
        capacity_left: u32,
    },
    AlreadyJoined,
    Full,
    NotFound,
}

impl AppState {
    pub fn is_member(&self, set: MembershipSet, id: &ListingId) -> bool {
        self.database.is_member(set, id).unwrap_or_else(|e| {
            warn!(%set, listing = %id, error = %e, "failed to read membership");
            false
        })
    }

    /// Ids in `set`, newest first.  May include ids of deleted listings.
    pub fn members(&self, set: MembershipSet) -> Vec<ListingId> {
        self.database.members(set).unwrap_or_else(|e| {
            warn!(%set, error = %e, "failed to read membership set");
            Vec::new()
        })
    }

    /// Listings whose ids are in `set`; dangling ids are skipped.
    pub fn listings_in(&self, set: MembershipSet) -> Vec<Listing> {
        self.members(set)
            .iter()
            .filter_map(|id| self.get_listing_by_id(id))
            .collect()
    }

    /// Listings the user created.  When `mine` is empty, falls back to
    /// listings hosted under the profile nickname.
    pub fn my_listings(&self) -> Vec<Listing> {
        let mine = self.listings_in(MembershipSet::Mine);
        if !mine.is_empty() {
            return mine;
        }

        let settings = self.settings();
        let Some(nickname) = settings.nickname() else {
            return Vec::new();
        };
        self.get_all_listings()
            .into_iter()
            .filter(|l| l.host.name.trim() == nickname)
            .collect()
    }

    /// Flip the favorite flag and return the new state.
    pub fn toggle_favorite(&mut self, id: &ListingId) -> bool {
        match self.database.toggle_member(MembershipSet::Favs, id) {
            Ok(now_favorite) => {
                self.events.publish(StoreKey::Favs);
                now_favorite
            }
            Err(e) => {
                warn!(listing = %id, error = %e, "failed to toggle favorite");
                self.is_member(MembershipSet::Favs, id)
            }
        }
    }

    /// Take one seat: add to `joined`, decrement capacity and notify the host
    /// with an unread join request.
    pub fn join_listing(&mut self, id: &ListingId) -> Result<JoinOutcome, ClientError> {
        let Some(mut listing) = self.get_listing_by_id(id) else {
            return Ok(JoinOutcome::NotFound);
        };
        if self.database.is_member(MembershipSet::Joined, id)? {
            return Ok(JoinOutcome::AlreadyJoined);
        }
        if listing.capacity_left == 0 {
            return Ok(JoinOutcome::Full);
        }

        listing.capacity_left -= 1;
        let request = NewNotification {
            host_name: listing.host.name.clone(),
            listing_id: listing.id.clone(),
            listing_title: listing.title.clone(),
            applicant_name: self.applicant_name(),
            kind: NotificationKind::JoinRequest,
        }
        .into_notification(NotificationId::generate(), Utc::now());
        self.database.record_join(&listing, &request)?;
        info!(
            listing = %id,
            capacity_left = listing.capacity_left,
            request = %request.id,
            "joined listing"
        );

        self.events.publish(StoreKey::Listings);
        self.events.publish(StoreKey::Joined);
        self.events.publish(StoreKey::Notifications);
        Ok(JoinOutcome::Joined {
            capacity_left: listing.capacity_left,
        })
    }

    /// Give the seat back.  Host notifications are left as they are.
    pub fn leave_listing(&mut self, id: &ListingId) -> bool {
        if !self.is_member(MembershipSet::Joined, id) {
            return false;
        }

        let result = match self.get_listing_by_id(id) {
            Some(mut listing) => {
                listing.capacity_left = listing.capacity_left.saturating_add(1);
                self.database.record_leave(&listing)
            }
            None => self
                .database
                .remove_member(MembershipSet::Joined, id)
                .map(|_| ()),
        };

        match result {
            Ok(()) => {
                info!(listing = %id, "left listing");
                self.events.publish(StoreKey::Listings);
                self.events.publish(StoreKey::Joined);
                true
            }
            Err(e) => {
                warn!(listing = %id, error = %e, "failed to leave listing");
                false
            }
        }
    }

    /// Send a contact message to the listing's host inbox.
    pub fn message_organizer(
        &mut self,
        id: &ListingId,
        name: &str,
        message: &str,
    ) -> Result<HostNotification, ClientError> {
        if name.trim().is_empty() {
            return Err(ValidationError::MissingName.into());
        }
        if message.trim().is_empty() {
            return Err(ValidationError::MissingMessage.into());
        }
        let listing = self
            .get_listing_by_id(id)
            .ok_or_else(|| ClientError::ListingNotFound(id.clone()))?;

        let sent = self.push_notification(NewNotification {
            host_name: listing.host.name,
            listing_id: listing.id,
            listing_title: listing.title,
            applicant_name: Some(name.trim().to_string()),
            kind: NotificationKind::Message,
        })?;
        info!(listing = %id, chars = message.chars().count(), "message sent to organizer");
        Ok(sent)
    }

    /// Session name, else profile nickname.
    fn applicant_name(&self) -> Option<String> {
        self.auth
            .session()
            .and_then(|s| s.display_name())
            .map(str::to_string)
            .or_else(|| self.settings().nickname().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use linkle_shared::{Category, FeeType, NewListing, NotificationStatus};

    use super::*;

    fn listing_with_capacity(state: &mut AppState, capacity: u32) -> ListingId {
        state
            .create_listing(NewListing {
                category: Category::Hobby,
                title: "Board games".into(),
                date: Utc::now().date_naive() + Duration::days(1),
                place: "東京都 新宿区".into(),
                capacity,
                fee_type: FeeType::Free,
                image_url: None,
                description: None,
                tags: Vec::new(),
            })
            .unwrap()
    }

    #[test]
    fn favorite_toggles() {
        let mut state = AppState::in_memory().unwrap();
        let id = ListingId::from("1");
        assert!(state.toggle_favorite(&id));
        assert!(state.is_member(MembershipSet::Favs, &id));
        assert!(!state.toggle_favorite(&id));
        assert!(!state.is_member(MembershipSet::Favs, &id));
    }

    #[test]
    fn join_then_leave_with_single_seat() {
        let mut state = AppState::in_memory().unwrap();
        let id = listing_with_capacity(&mut state, 1);

        assert_eq!(
            state.join_listing(&id).unwrap(),
            JoinOutcome::Joined { capacity_left: 0 }
        );
        assert_eq!(state.get_listing_by_id(&id).unwrap().capacity_left, 0);
        assert!(state.is_member(MembershipSet::Joined, &id));

        let inbox = state.get_notifications("You");
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationKind::JoinRequest);
        assert_eq!(inbox[0].status, NotificationStatus::Unread);
        assert_eq!(inbox[0].listing_id, id);

        assert_eq!(state.join_listing(&id).unwrap(), JoinOutcome::AlreadyJoined);

        assert!(state.leave_listing(&id));
        assert_eq!(state.get_listing_by_id(&id).unwrap().capacity_left, 1);
        assert!(!state.is_member(MembershipSet::Joined, &id));
        assert_eq!(state.get_notifications("You").len(), 1);
        assert!(!state.leave_listing(&id));
    }

    #[test]
    fn full_and_missing_listings() {
        let mut state = AppState::in_memory().unwrap();
        let id = listing_with_capacity(&mut state, 1);
        state.join_listing(&id).unwrap();
        state.database.remove_member(MembershipSet::Joined, &id).unwrap();

        assert_eq!(state.join_listing(&id).unwrap(), JoinOutcome::Full);
        assert_eq!(
            state.join_listing(&ListingId::from("nope")).unwrap(),
            JoinOutcome::NotFound
        );
    }

    #[test]
    fn joining_a_seed_listing_persists_an_override() {
        let seed = crate::seed::demo_listings();
        let target = seed.iter().find(|l| l.capacity_left > 0).unwrap().clone();
        let mut state = AppState::new(linkle_store::Database::open_in_memory().unwrap(), seed);

        state.join_listing(&target.id).unwrap();
        let stored = state.database.get_listing(&target.id).unwrap();
        assert_eq!(stored.capacity_left, target.capacity_left - 1);
        assert_eq!(
            state.get_listing_by_id(&target.id).unwrap().capacity_left,
            target.capacity_left - 1
        );
        assert_eq!(state.seed()[0].capacity_left, crate::seed::demo_listings()[0].capacity_left);
    }

    #[test]
    fn listings_in_skips_dangling_ids() {
        let mut state = AppState::in_memory().unwrap();
        let id = listing_with_capacity(&mut state, 2);
        state.toggle_favorite(&id);
        state.toggle_favorite(&ListingId::from("gone"));

        let favs = state.listings_in(MembershipSet::Favs);
        assert_eq!(favs.len(), 1);
        assert_eq!(favs[0].id, id);
        assert_eq!(state.members(MembershipSet::Favs).len(), 2);
    }

    #[test]
    fn my_listings_falls_back_to_nickname() {
        let mut state = AppState::in_memory().unwrap();
        let id = listing_with_capacity(&mut state, 2);
        state.database.clear_set(MembershipSet::Mine).unwrap();
        assert!(state.my_listings().is_empty());

        state
            .save_settings(linkle_shared::UserSettings {
                nickname: "You".into(),
                city: "新宿区".into(),
                ..Default::default()
            })
            .unwrap();
        let mine = state.my_listings();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, id);
    }

    #[test]
    fn message_organizer_requires_both_fields() {
        let mut state = AppState::in_memory().unwrap();
        let id = listing_with_capacity(&mut state, 2);

        assert!(matches!(
            state.message_organizer(&id, " ", "hello"),
            Err(ClientError::Validation(ValidationError::MissingName))
        ));
        assert!(matches!(
            state.message_organizer(&id, "Hanako", ""),
            Err(ClientError::Validation(ValidationError::MissingMessage))
        ));
        assert!(matches!(
            state.message_organizer(&ListingId::from("nope"), "Hanako", "hi"),
            Err(ClientError::ListingNotFound(_))
        ));

        let n = state.message_organizer(&id, "Hanako", "Is parking available?").unwrap();
        assert_eq!(n.kind, NotificationKind::Message);
        assert_eq!(n.applicant_name.as_deref(), Some("Hanako"));
        assert_eq!(state.unread_count("You"), 1);
    }

    #[test]
    fn failed_notification_write_is_reported() {
        let mut state = AppState::in_memory().unwrap();
        let id = listing_with_capacity(&mut state, 1);
        state
            .database
            .conn()
            .execute_batch(
                "CREATE TRIGGER reject_notifications BEFORE INSERT ON notifications
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        assert!(matches!(
            state.message_organizer(&id, "Hanako", "Is parking available?"),
            Err(ClientError::Store(_))
        ));

        assert!(matches!(state.join_listing(&id), Err(ClientError::Store(_))));
        assert_eq!(state.get_listing_by_id(&id).unwrap().capacity_left, 1);
        assert!(!state.is_member(MembershipSet::Joined, &id));
        assert!(state.get_notifications("You").is_empty());
    }
}
