//! The per-device `joined` / `favs` / `mine` listing id sets.
//!
//! Ids are kept even when the listing they point at no longer exists; readers
//! skip dangling ids.

use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension};

use crate::database::{fmt_ts, Database};
use crate::error::Result;
use crate::listings::{listing_params, LISTING_COLUMNS};
use crate::models::{HostNotification, Listing, ListingId, MembershipSet};
use crate::notifications::insert_notification_row;

impl Database {
    /// Add `id` to `set`.  Returns `false` if it was already present.
    pub fn add_member(&self, set: MembershipSet, id: &ListingId) -> Result<bool> {
        let affected = self.conn().execute(
            "INSERT OR IGNORE INTO memberships (set_name, listing_id, added_at)
             VALUES (?1, ?2, ?3)",
            params![set.as_str(), id.as_str(), fmt_ts(&Utc::now())],
        )?;
        Ok(affected > 0)
    }

    /// Remove `id` from `set`.  Returns `false` if it was not present.
    pub fn remove_member(&self, set: MembershipSet, id: &ListingId) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM memberships WHERE set_name = ?1 AND listing_id = ?2",
            params![set.as_str(), id.as_str()],
        )?;
        Ok(affected > 0)
    }

    pub fn is_member(&self, set: MembershipSet, id: &ListingId) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM memberships WHERE set_name = ?1 AND listing_id = ?2",
                params![set.as_str(), id.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Flip membership of `id` in `set` and return the new state.
    pub fn toggle_member(&self, set: MembershipSet, id: &ListingId) -> Result<bool> {
        if self.remove_member(set, id)? {
            Ok(false)
        } else {
            self.add_member(set, id)?;
            Ok(true)
        }
    }

    /// Ids in `set`, most recently added first.
    pub fn members(&self, set: MembershipSet) -> Result<Vec<ListingId>> {
        let mut stmt = self.conn().prepare(
            "SELECT listing_id FROM memberships
             WHERE set_name = ?1
             ORDER BY added_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map(params![set.as_str()], |row| {
            row.get::<_, String>(0).map(ListingId)
        })?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    pub fn clear_set(&self, set: MembershipSet) -> Result<usize> {
        let affected = self.conn().execute(
            "DELETE FROM memberships WHERE set_name = ?1",
            params![set.as_str()],
        )?;
        Ok(affected)
    }

    /// Store `listing` (carrying its already-decremented capacity), add it
    /// to `joined` and append the host's join `request` in one transaction.
    /// Seed listings land here as overrides.
    pub fn record_join(&mut self, listing: &Listing, request: &HostNotification) -> Result<()> {
        self.write_with_membership(listing, Some(request))
    }

    /// Store `listing` (carrying its restored capacity) and drop it from
    /// `joined` in one transaction.
    pub fn record_leave(&mut self, listing: &Listing) -> Result<()> {
        self.write_with_membership(listing, None)
    }

    fn write_with_membership(
        &mut self,
        listing: &Listing,
        join_request: Option<&HostNotification>,
    ) -> Result<()> {
        let values = listing_params(listing)?;
        let tx = self.conn_mut().transaction()?;
        tx.execute(
            &format!(
                "INSERT OR REPLACE INTO listings ({LISTING_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params_from_iter(values.iter()),
        )?;
        if let Some(request) = join_request {
            tx.execute(
                "INSERT OR IGNORE INTO memberships (set_name, listing_id, added_at)
                 VALUES (?1, ?2, ?3)",
                params![MembershipSet::Joined.as_str(), listing.id.as_str(), fmt_ts(&Utc::now())],
            )?;
            insert_notification_row(&tx, request)?;
        } else {
            tx.execute(
                "DELETE FROM memberships WHERE set_name = ?1 AND listing_id = ?2",
                params![MembershipSet::Joined.as_str(), listing.id.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use linkle_shared::NewNotification;

    use crate::models::{NotificationId, NotificationKind};

    use super::*;

    fn id(s: &str) -> ListingId {
        ListingId::from(s)
    }

    #[test]
    fn add_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.add_member(MembershipSet::Joined, &id("1")).unwrap());
        assert!(!db.add_member(MembershipSet::Joined, &id("1")).unwrap());
        assert_eq!(db.members(MembershipSet::Joined).unwrap(), vec![id("1")]);
    }

    #[test]
    fn sets_are_independent() {
        let db = Database::open_in_memory().unwrap();
        db.add_member(MembershipSet::Favs, &id("1")).unwrap();

        assert!(db.is_member(MembershipSet::Favs, &id("1")).unwrap());
        assert!(!db.is_member(MembershipSet::Joined, &id("1")).unwrap());
        assert!(!db.is_member(MembershipSet::Mine, &id("1")).unwrap());
    }

    #[test]
    fn members_are_newest_first() {
        let db = Database::open_in_memory().unwrap();
        for n in ["1", "2", "3"] {
            db.add_member(MembershipSet::Favs, &id(n)).unwrap();
        }
        assert_eq!(
            db.members(MembershipSet::Favs).unwrap(),
            vec![id("3"), id("2"), id("1")]
        );
    }

    #[test]
    fn toggle_flips_state() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.toggle_member(MembershipSet::Favs, &id("9")).unwrap());
        assert!(db.is_member(MembershipSet::Favs, &id("9")).unwrap());
        assert!(!db.toggle_member(MembershipSet::Favs, &id("9")).unwrap());
        assert!(!db.is_member(MembershipSet::Favs, &id("9")).unwrap());
    }

    #[test]
    fn dangling_ids_are_kept() {
        let db = Database::open_in_memory().unwrap();
        db.add_member(MembershipSet::Joined, &id("gone")).unwrap();
        assert!(!db.listing_exists(&id("gone")).unwrap());
        assert_eq!(db.members(MembershipSet::Joined).unwrap(), vec![id("gone")]);
    }

    fn join_request(listing: &Listing) -> HostNotification {
        NewNotification {
            host_name: listing.host.name.clone(),
            listing_id: listing.id.clone(),
            listing_title: listing.title.clone(),
            applicant_name: Some("Hanako".into()),
            kind: NotificationKind::JoinRequest,
        }
        .into_notification(NotificationId::generate(), Utc::now())
    }

    #[test]
    fn join_and_leave_write_capacity_with_membership() {
        let mut db = Database::open_in_memory().unwrap();
        let mut listing = crate::listings::tests::sample_listing("7", 0);

        listing.capacity_left = 3;
        db.record_join(&listing, &join_request(&listing)).unwrap();
        assert!(db.is_member(MembershipSet::Joined, &listing.id).unwrap());
        assert_eq!(db.get_listing(&listing.id).unwrap().capacity_left, 3);
        assert_eq!(db.notifications_for_host(&listing.host.name).unwrap().len(), 1);

        listing.capacity_left = 4;
        db.record_leave(&listing).unwrap();
        assert!(!db.is_member(MembershipSet::Joined, &listing.id).unwrap());
        assert_eq!(db.get_listing(&listing.id).unwrap().capacity_left, 4);
    }

    #[test]
    fn failed_join_request_rolls_back_the_join() {
        let mut db = Database::open_in_memory().unwrap();
        let mut listing = crate::listings::tests::sample_listing("8", 0);
        listing.capacity_left = 5;
        db.insert_listing(&listing).unwrap();
        db.conn()
            .execute_batch(
                "CREATE TRIGGER reject_notifications BEFORE INSERT ON notifications
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let mut joined = listing.clone();
        joined.capacity_left = 4;
        assert!(db.record_join(&joined, &join_request(&joined)).is_err());

        assert!(!db.is_member(MembershipSet::Joined, &listing.id).unwrap());
        assert_eq!(db.get_listing(&listing.id).unwrap().capacity_left, 5);
        assert!(db.list_notifications().unwrap().is_empty());
    }

    #[test]
    fn clear_only_touches_one_set() {
        let db = Database::open_in_memory().unwrap();
        for set in MembershipSet::ALL {
            db.add_member(set, &id("1")).unwrap();
        }
        db.add_member(MembershipSet::Favs, &id("2")).unwrap();

        assert_eq!(db.clear_set(MembershipSet::Favs).unwrap(), 2);
        assert!(db.members(MembershipSet::Favs).unwrap().is_empty());
        assert_eq!(db.members(MembershipSet::Joined).unwrap(), vec![id("1")]);
        assert_eq!(db.members(MembershipSet::Mine).unwrap(), vec![id("1")]);
    }
}
