// Database queries — CRUD operations for the posts table.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust
// interfaces. Verdict maps are stored as JSON text columns and parsed back
// into BTreeMaps on read.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{DailyStats, Post};
use crate::moderation::verdict::{ModerationVerdict, Severity};

const POST_COLUMNS: &str = "id, text, author, flagged, reason, severity, confidence, \
                            categories, category_scores, views, reports, created_at";

/// Insert a post with its verdict and return the stored row.
pub fn create_post(
    conn: &Connection,
    text: &str,
    author: &str,
    verdict: &ModerationVerdict,
) -> Result<Post> {
    let categories_json =
        serde_json::to_string(&verdict.categories).context("Failed to encode categories")?;
    let scores_json = serde_json::to_string(&verdict.category_scores)
        .context("Failed to encode category scores")?;

    conn.execute(
        "INSERT INTO posts (text, author, flagged, reason, severity, confidence,
                            categories, category_scores)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            text,
            author,
            verdict.flagged,
            verdict.reason,
            verdict.severity.as_str(),
            verdict.confidence,
            categories_json,
            scores_json,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_post(conn, id)?.context("Post vanished immediately after insert")
}

/// Fetch a single post by id.
pub fn get_post(conn: &Connection, id: i64) -> Result<Option<Post>> {
    let mut stmt = conn.prepare(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"))?;
    let raw = stmt.query_row(params![id], read_raw).optional()?;
    raw.map(RawPost::into_post).transpose()
}

/// All approved (not flagged) posts, newest first.
pub fn approved_posts(conn: &Connection) -> Result<Vec<Post>> {
    list_posts(conn, "flagged = 0")
}

/// All flagged posts, newest first — the admin review queue.
pub fn flagged_posts(conn: &Connection) -> Result<Vec<Post>> {
    list_posts(conn, "flagged = 1")
}

/// Posts that users have reported at least once, newest first.
pub fn reported_posts(conn: &Connection) -> Result<Vec<Post>> {
    list_posts(conn, "reports > 0")
}

fn list_posts(conn: &Connection, filter: &str) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE {filter} ORDER BY created_at DESC, id DESC"
    ))?;
    let raw: Vec<RawPost> = stmt
        .query_map([], read_raw)?
        .collect::<rusqlite::Result<_>>()?;
    raw.into_iter().map(RawPost::into_post).collect()
}

/// Bump the view counter. Returns false when the post doesn't exist.
pub fn increment_views(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("UPDATE posts SET views = views + 1 WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

/// Bump the report counter. Returns false when the post doesn't exist.
pub fn increment_reports(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE posts SET reports = reports + 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(changed > 0)
}

/// Total and flagged post counts.
pub fn post_counts(conn: &Connection) -> Result<(i64, i64)> {
    let counts = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(flagged), 0) FROM posts",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(counts)
}

/// Daily moderation statistics for the last `days` days, oldest first.
///
/// Aggregation happens in Rust rather than SQL because the per-day category
/// counts require parsing the stored JSON maps.
pub fn moderation_stats(conn: &Connection, days: u32) -> Result<Vec<DailyStats>> {
    // created_at is stored as SQLite's UTC "YYYY-MM-DD HH:MM:SS", so a
    // string comparison against the same format is a correct time filter.
    let cutoff = (chrono::Utc::now() - chrono::Duration::days(days as i64))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let mut stmt = conn.prepare(
        "SELECT date(created_at), flagged, confidence, categories
         FROM posts
         WHERE created_at >= ?1",
    )?;
    let rows: Vec<(String, bool, f64, String)> = stmt
        .query_map(params![cutoff], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<rusqlite::Result<_>>()?;

    // date -> (total, flagged, confidence sum, category counts)
    let mut by_day: BTreeMap<String, (u32, u32, f64, BTreeMap<String, u32>)> = BTreeMap::new();

    for (date, flagged, confidence, categories_json) in rows {
        let entry = by_day.entry(date).or_default();
        entry.0 += 1;
        entry.2 += confidence;
        if flagged {
            entry.1 += 1;
            let categories: BTreeMap<String, bool> = serde_json::from_str(&categories_json)
                .context("Failed to decode stored categories")?;
            for (category, triggered) in categories {
                if triggered {
                    *entry.3.entry(category).or_default() += 1;
                }
            }
        }
    }

    Ok(by_day
        .into_iter()
        .map(|(date, (total, flagged, confidence_sum, categories))| DailyStats {
            date,
            total_posts: total,
            flagged_posts: flagged,
            average_confidence: confidence_sum / total as f64,
            categories,
        })
        .collect())
}

// --- Row mapping ---

/// Raw column values as rusqlite hands them over; JSON and enum parsing
/// happens in `into_post` so query closures stay on rusqlite's error type.
struct RawPost {
    id: i64,
    text: String,
    author: String,
    flagged: bool,
    reason: Option<String>,
    severity: String,
    confidence: f64,
    categories: String,
    category_scores: String,
    views: u32,
    reports: u32,
    created_at: String,
}

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawPost> {
    Ok(RawPost {
        id: row.get(0)?,
        text: row.get(1)?,
        author: row.get(2)?,
        flagged: row.get(3)?,
        reason: row.get(4)?,
        severity: row.get(5)?,
        confidence: row.get(6)?,
        categories: row.get(7)?,
        category_scores: row.get(8)?,
        views: row.get(9)?,
        reports: row.get(10)?,
        created_at: row.get(11)?,
    })
}

impl RawPost {
    fn into_post(self) -> Result<Post> {
        let severity: Severity = self.severity.parse()?;
        let categories = serde_json::from_str(&self.categories)
            .context("Failed to decode stored categories")?;
        let category_scores = serde_json::from_str(&self.category_scores)
            .context("Failed to decode stored category scores")?;

        Ok(Post {
            id: self.id,
            text: self.text,
            author: self.author,
            moderation_result: ModerationVerdict {
                flagged: self.flagged,
                reason: self.reason,
                severity,
                confidence: self.confidence,
                categories,
                category_scores,
            },
            views: self.views,
            reports: self.reports,
            created_at: self.created_at,
        })
    }
}
