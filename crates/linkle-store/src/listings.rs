//! CRUD operations for [`Listing`] records.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension};

use crate::database::{conversion_err, fmt_ts, not_found, parse_ts, Database};
use crate::error::Result;
use crate::models::{HostRef, Listing, ListingId, MembershipSet};

pub(crate) const LISTING_COLUMNS: &str = "id, category, title, date, place, capacity_left, host_name, \
     host_avatar_url, image_url, fee_type, description, tags, views, created_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new listing.  Fails if the id is taken.
    pub fn insert_listing(&self, listing: &Listing) -> Result<()> {
        self.conn().execute(
            &format!(
                "INSERT INTO listings ({LISTING_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params_from_iter(listing_params(listing)?.iter()),
        )?;
        Ok(())
    }

    /// Insert or overwrite a listing by id.
    pub fn upsert_listing(&self, listing: &Listing) -> Result<()> {
        self.conn().execute(
            &format!(
                "INSERT OR REPLACE INTO listings ({LISTING_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params_from_iter(listing_params(listing)?.iter()),
        )?;
        Ok(())
    }

    /// Insert a listing created by this device and register it in the
    /// `mine` set, atomically.
    pub fn insert_owned_listing(&mut self, listing: &Listing) -> Result<()> {
        let values = listing_params(listing)?;
        let tx = self.conn_mut().transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO listings ({LISTING_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params_from_iter(values.iter()),
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO memberships (set_name, listing_id, added_at) VALUES (?1, ?2, ?3)",
            params![
                MembershipSet::Mine.as_str(),
                listing.id.as_str(),
                fmt_ts(&Utc::now()),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single listing by id.
    pub fn get_listing(&self, id: &ListingId) -> Result<Listing> {
        self.conn()
            .query_row(
                &format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?1"),
                params![id.as_str()],
                row_to_listing,
            )
            .map_err(not_found)
    }

    pub fn listing_exists(&self, id: &ListingId) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM listings WHERE id = ?1",
                params![id.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// List all persisted listings, newest first.
    pub fn list_listings(&self) -> Result<Vec<Listing>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC, id DESC"
        ))?;

        let rows = stmt.query_map([], row_to_listing)?;

        let mut listings = Vec::new();
        for row in rows {
            listings.push(row?);
        }
        Ok(listings)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a listing and scrub its id from every membership set in one
    /// transaction.  Returns `true` if the listing row existed.
    pub fn delete_listing_everywhere(&mut self, id: &ListingId) -> Result<bool> {
        let tx = self.conn_mut().transaction()?;
        let affected = tx.execute("DELETE FROM listings WHERE id = ?1", params![id.as_str()])?;
        tx.execute(
            "DELETE FROM memberships WHERE listing_id = ?1",
            params![id.as_str()],
        )?;
        tx.commit()?;
        Ok(affected > 0)
    }

    /// Delete every listing in the `mine` set, empty `mine`, and scrub those
    /// ids from the other sets.  Returns the number of listing rows removed.
    pub fn delete_owned_listings(&mut self) -> Result<usize> {
        let tx = self.conn_mut().transaction()?;
        let removed = tx.execute(
            "DELETE FROM listings WHERE id IN
                (SELECT listing_id FROM memberships WHERE set_name = ?1)",
            params![MembershipSet::Mine.as_str()],
        )?;
        tx.execute(
            "DELETE FROM memberships WHERE listing_id IN
                (SELECT listing_id FROM memberships WHERE set_name = ?1)",
            params![MembershipSet::Mine.as_str()],
        )?;
        tx.commit()?;
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn listing_params(l: &Listing) -> Result<Vec<Box<dyn rusqlite::ToSql>>> {
    let tags = serde_json::to_string(&l.tags)?;
    Ok(vec![
        Box::new(l.id.0.clone()),
        Box::new(l.category.as_str()),
        Box::new(l.title.clone()),
        Box::new(l.date.format("%Y-%m-%d").to_string()),
        Box::new(l.place.clone()),
        Box::new(l.capacity_left),
        Box::new(l.host.name.clone()),
        Box::new(l.host.avatar_url.clone()),
        Box::new(l.image_url.clone()),
        Box::new(l.fee_type.as_str()),
        Box::new(l.description.clone()),
        Box::new(tags),
        Box::new(i64::try_from(l.views).unwrap_or(i64::MAX)),
        Box::new(fmt_ts(&l.created_at)),
    ])
}

/// Map a `rusqlite::Row` to a [`Listing`].
pub(crate) fn row_to_listing(row: &rusqlite::Row<'_>) -> rusqlite::Result<Listing> {
    let id: String = row.get(0)?;
    let category_str: String = row.get(1)?;
    let title: String = row.get(2)?;
    let date_str: String = row.get(3)?;
    let place: String = row.get(4)?;
    let capacity_left: i64 = row.get(5)?;
    let host_name: String = row.get(6)?;
    let host_avatar_url: Option<String> = row.get(7)?;
    let image_url: String = row.get(8)?;
    let fee_str: String = row.get(9)?;
    let description: Option<String> = row.get(10)?;
    let tags_json: String = row.get(11)?;
    let views: i64 = row.get(12)?;
    let created_str: String = row.get(13)?;

    let category = category_str.parse().map_err(|e| conversion_err(1, e))?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| conversion_err(3, e))?;
    let capacity_left = u32::try_from(capacity_left).map_err(|e| conversion_err(5, e))?;
    let fee_type = fee_str.parse().map_err(|e| conversion_err(9, e))?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|e| conversion_err(11, e))?;
    let created_at = parse_ts(&created_str).map_err(|e| conversion_err(13, e))?;

    Ok(Listing {
        id: ListingId(id),
        category,
        title,
        date,
        place,
        capacity_left,
        host: HostRef {
            name: host_name,
            avatar_url: host_avatar_url,
        },
        image_url,
        fee_type,
        description,
        tags,
        views: u64::try_from(views).unwrap_or(0),
        created_at,
    })
}
