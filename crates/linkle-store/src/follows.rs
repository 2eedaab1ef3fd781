use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::{fmt_ts, Database};
use crate::error::Result;

impl Database {
    /// Record whether the user follows the organizer stored under `key`
    /// (see `linkle_shared::organizer::follow_key`).
    pub fn set_following(&self, key: &str, following: bool) -> Result<()> {
        self.conn().execute(
            "INSERT INTO follows (organizer_key, following, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(organizer_key) DO UPDATE SET
                following = excluded.following,
                updated_at = excluded.updated_at",
            params![key, following, fmt_ts(&Utc::now())],
        )?;
        Ok(())
    }

    /// `false` for organizers never followed.
    pub fn is_following(&self, key: &str) -> Result<bool> {
        let following: Option<bool> = self
            .conn()
            .query_row(
                "SELECT following FROM follows WHERE organizer_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(following.unwrap_or(false))
    }

    /// Keys of every followed organizer, most recently followed first.
    pub fn list_followed(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn().prepare(
            "SELECT organizer_key FROM follows WHERE following = 1
             ORDER BY updated_at DESC",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_following() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.is_following("mika sato").unwrap());
    }

    #[test]
    fn follow_and_unfollow() {
        let db = Database::open_in_memory().unwrap();
        db.set_following("mika sato", true).unwrap();
        assert!(db.is_following("mika sato").unwrap());
        assert_eq!(db.list_followed().unwrap(), vec!["mika sato".to_string()]);

        db.set_following("mika sato", false).unwrap();
        assert!(!db.is_following("mika sato").unwrap());
        assert!(db.list_followed().unwrap().is_empty());
    }
}
