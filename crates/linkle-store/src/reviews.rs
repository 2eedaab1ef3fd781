//! Guest reviews on organizer pages.

use chrono::NaiveDate;
use rusqlite::params;

use crate::database::{conversion_err, Database};
use crate::error::Result;
use crate::models::Review;

impl Database {
    pub fn insert_review(&self, organizer_slug: &str, review: &Review) -> Result<()> {
        self.conn().execute(
            "INSERT INTO reviews (id, organizer_slug, author, rating, comment, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                review.id,
                organizer_slug,
                review.author,
                review.rating,
                review.comment,
                review.date.format("%Y-%m-%d").to_string(),
            ],
        )?;
        Ok(())
    }

    /// Reviews of one organizer in insertion order; callers sort for display.
    pub fn list_reviews(&self, organizer_slug: &str) -> Result<Vec<Review>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, author, rating, comment, date FROM reviews
             WHERE organizer_slug = ?1
             ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![organizer_slug], row_to_review)?;

        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row?);
        }
        Ok(reviews)
    }

    /// Remove a reported review.  Returns `false` if it did not exist.
    pub fn delete_review(&self, organizer_slug: &str, id: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM reviews WHERE organizer_slug = ?1 AND id = ?2",
            params![organizer_slug, id],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_review(row: &rusqlite::Row<'_>) -> rusqlite::Result<Review> {
    let date_str: String = row.get(4)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| conversion_err(4, e))?;

    Ok(Review {
        id: row.get(0)?,
        author: row.get(1)?,
        rating: row.get(2)?,
        comment: row.get(3)?,
        date,
    })
}
