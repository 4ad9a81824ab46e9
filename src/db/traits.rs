// Database trait — backend-agnostic async interface for all DB operations.
//
// SqliteDatabase is the only implementor today, but handlers and the CLI
// take `Arc<dyn Database>` so tests can swap in an in-memory database and a
// future backend doesn't ripple through callers.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{DailyStats, Post};
use crate::moderation::verdict::ModerationVerdict;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Posts ---

    /// Store a post with its verdict and return the created row.
    async fn create_post(&self, text: &str, author: &str, verdict: &ModerationVerdict)
        -> Result<Post>;

    /// Fetch a single post by id.
    async fn get_post(&self, id: i64) -> Result<Option<Post>>;

    /// Approved (not flagged) posts, newest first.
    async fn approved_posts(&self) -> Result<Vec<Post>>;

    /// Flagged posts, newest first — the admin review queue.
    async fn flagged_posts(&self) -> Result<Vec<Post>>;

    /// Posts reported by users at least once, newest first.
    async fn reported_posts(&self) -> Result<Vec<Post>>;

    /// Bump a post's view counter. Returns false for unknown ids.
    async fn record_view(&self, id: i64) -> Result<bool>;

    /// Bump a post's report counter. Returns false for unknown ids.
    async fn report_post(&self, id: i64) -> Result<bool>;

    // --- Statistics ---

    /// Daily moderation statistics for the last `days` days, oldest first.
    async fn moderation_stats(&self, days: u32) -> Result<Vec<DailyStats>>;

    /// (total posts, flagged posts).
    async fn post_counts(&self) -> Result<(i64, i64)>;
}
