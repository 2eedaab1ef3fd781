use rusqlite::Connection;

const UP_SQL: &str = r#"
-- Account settings, stored as a single JSON document
CREATE TABLE IF NOT EXISTS app_settings (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    json TEXT NOT NULL
);

-- Follow state per organizer (lowercased display name)
CREATE TABLE IF NOT EXISTS follows (
    organizer_key TEXT PRIMARY KEY NOT NULL,
    following     INTEGER NOT NULL,        -- boolean 0/1
    updated_at    TEXT NOT NULL
);

-- Guest reviews per organizer slug
CREATE TABLE IF NOT EXISTS reviews (
    id             TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    organizer_slug TEXT NOT NULL,
    author         TEXT NOT NULL,
    rating         INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment        TEXT NOT NULL,
    date           TEXT NOT NULL                -- YYYY-MM-DD
);

CREATE INDEX IF NOT EXISTS idx_reviews_organizer ON reviews(organizer_slug);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
