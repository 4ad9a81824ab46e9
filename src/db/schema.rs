// Database schema — table creation.
//
// A `schema_version` table tracks which migrations have run so future
// schema changes can be applied incrementally.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Posts with their moderation verdict attached at creation time.
        -- The verdict columns are immutable history: they record what the
        -- pipeline decided when the post was submitted.
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            author TEXT NOT NULL DEFAULT 'Anonymous',
            flagged INTEGER NOT NULL,          -- 0 or 1
            reason TEXT,                       -- null when not flagged
            severity TEXT NOT NULL,            -- low / medium / high
            confidence REAL NOT NULL,          -- 0.0 to 1.0
            categories TEXT NOT NULL,          -- JSON object: category -> bool
            category_scores TEXT NOT NULL,     -- JSON object: category -> score
            views INTEGER NOT NULL DEFAULT 0,
            reports INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_flagged
            ON posts(flagged, created_at DESC);

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        ",
    )
    .context("Failed to create tables")?;

    Ok(())
}

/// Count the number of user-created tables in the database.
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
        assert!(table_count(&conn).unwrap() >= 2);
    }
}
