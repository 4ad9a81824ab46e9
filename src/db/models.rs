// Data models — Rust structs that map to database rows.
//
// These are the types that flow through the application. They're separate
// from the database queries so other modules can use them without depending
// on rusqlite directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::moderation::verdict::ModerationVerdict;

/// A submitted post with its moderation verdict.
///
/// The verdict is attached at creation time and never mutated; only the
/// `views` and `reports` counters change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub moderation_result: ModerationVerdict,
    pub views: u32,
    pub reports: u32,
    pub created_at: String,
}

/// One day's moderation statistics, aggregated from stored posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    pub total_posts: u32,
    pub flagged_posts: u32,
    pub average_confidence: f64,
    /// How often each category triggered among flagged posts that day
    pub categories: BTreeMap<String, u32>,
}
