//! v001 -- Initial schema creation.
//!
//! Creates the three core tables: `listings`, `memberships` and
//! `notifications`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Listings (user-created, plus seed listings whose capacity changed)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS listings (
    id              TEXT PRIMARY KEY NOT NULL,   -- millisecond timestamp string
    category        TEXT NOT NULL,               -- sports | learning | hobby
    title           TEXT NOT NULL,
    date            TEXT NOT NULL,               -- YYYY-MM-DD
    place           TEXT NOT NULL,
    capacity_left   INTEGER NOT NULL CHECK (capacity_left >= 0),
    host_name       TEXT NOT NULL,
    host_avatar_url TEXT,
    image_url       TEXT NOT NULL DEFAULT '',
    fee_type        TEXT NOT NULL,               -- free | paid
    description     TEXT,
    tags            TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    views           INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL                -- RFC-3339
);

CREATE INDEX IF NOT EXISTS idx_listings_created_at ON listings(created_at DESC);

-- ----------------------------------------------------------------
-- Membership sets: joined / favs / mine
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS memberships (
    set_name   TEXT NOT NULL,
    listing_id TEXT NOT NULL,                    -- no FK: dangling ids are allowed
    added_at   TEXT NOT NULL,

    PRIMARY KEY (set_name, listing_id)
);

-- ----------------------------------------------------------------
-- Organizer inbox
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS notifications (
    seq            INTEGER PRIMARY KEY AUTOINCREMENT,  -- log position, newest = highest
    id             TEXT NOT NULL UNIQUE,
    host_name      TEXT NOT NULL,
    host_key       TEXT NOT NULL,                      -- normalized host_name
    listing_id     TEXT NOT NULL,
    listing_title  TEXT NOT NULL,
    created_at     TEXT NOT NULL,                      -- RFC-3339
    applicant_name TEXT,
    status         TEXT NOT NULL DEFAULT 'unread',     -- unread | read
    kind           TEXT NOT NULL                       -- join-request | message
);

CREATE INDEX IF NOT EXISTS idx_notifications_host ON notifications(host_key, seq DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
