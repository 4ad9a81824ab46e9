// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Send.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points — Rust enforces this because
// MutexGuard is !Send.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{DailyStats, Post};
use super::traits::Database;
use crate::moderation::verdict::ModerationVerdict;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn create_post(
        &self,
        text: &str,
        author: &str,
        verdict: &ModerationVerdict,
    ) -> Result<Post> {
        let conn = self.conn.lock().await;
        super::queries::create_post(&conn, text, author, verdict)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>> {
        let conn = self.conn.lock().await;
        super::queries::get_post(&conn, id)
    }

    async fn approved_posts(&self) -> Result<Vec<Post>> {
        let conn = self.conn.lock().await;
        super::queries::approved_posts(&conn)
    }

    async fn flagged_posts(&self) -> Result<Vec<Post>> {
        let conn = self.conn.lock().await;
        super::queries::flagged_posts(&conn)
    }

    async fn reported_posts(&self) -> Result<Vec<Post>> {
        let conn = self.conn.lock().await;
        super::queries::reported_posts(&conn)
    }

    async fn record_view(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::increment_views(&conn, id)
    }

    async fn report_post(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::increment_reports(&conn, id)
    }

    async fn moderation_stats(&self, days: u32) -> Result<Vec<DailyStats>> {
        let conn = self.conn.lock().await;
        super::queries::moderation_stats(&conn, days)
    }

    async fn post_counts(&self) -> Result<(i64, i64)> {
        let conn = self.conn.lock().await;
        super::queries::post_counts(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use crate::moderation::keywords::KeywordClassifier;
    use crate::moderation::normalize;
    use crate::moderation::traits::Classifier;

    async fn test_db() -> SqliteDatabase {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        SqliteDatabase::new(conn)
    }

    fn verdict_for(text: &str) -> ModerationVerdict {
        let fallback = KeywordClassifier::new();
        let scores = fallback.scan(text);
        normalize(&scores, |c| fallback.flag_threshold(c))
    }

    #[tokio::test]
    async fn test_post_round_trip_preserves_verdict() {
        let db = test_db().await;
        let verdict = verdict_for("you are stupid");

        let post = db.create_post("you are stupid", "alice", &verdict).await.unwrap();
        let fetched = db.get_post(post.id).await.unwrap().unwrap();

        assert_eq!(fetched.text, "you are stupid");
        assert_eq!(fetched.author, "alice");
        assert_eq!(fetched.moderation_result, verdict);
    }

    #[tokio::test]
    async fn test_approved_posts_excludes_flagged() {
        let db = test_db().await;
        db.create_post("sunny days", "a", &verdict_for("sunny days"))
            .await
            .unwrap();
        db.create_post("you idiot", "b", &verdict_for("you idiot"))
            .await
            .unwrap();

        let approved = db.approved_posts().await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].text, "sunny days");

        let flagged = db.flagged_posts().await.unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].text, "you idiot");
    }

    #[tokio::test]
    async fn test_report_and_view_counters() {
        let db = test_db().await;
        let post = db
            .create_post("hello", "a", &verdict_for("hello"))
            .await
            .unwrap();

        assert!(db.report_post(post.id).await.unwrap());
        assert!(db.record_view(post.id).await.unwrap());
        assert!(!db.report_post(9999).await.unwrap());

        let fetched = db.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(fetched.reports, 1);
        assert_eq!(fetched.views, 1);

        let reported = db.reported_posts().await.unwrap();
        assert_eq!(reported.len(), 1);
    }

    #[tokio::test]
    async fn test_moderation_stats_aggregates_by_day() {
        let db = test_db().await;
        db.create_post("sunny days", "a", &verdict_for("sunny days"))
            .await
            .unwrap();
        db.create_post("you idiot", "b", &verdict_for("you idiot"))
            .await
            .unwrap();

        let stats = db.moderation_stats(7).await.unwrap();
        assert_eq!(stats.len(), 1); // everything inserted today
        assert_eq!(stats[0].total_posts, 2);
        assert_eq!(stats[0].flagged_posts, 1);
        assert_eq!(stats[0].categories.get("hate"), Some(&1));
        assert!(stats[0].average_confidence > 0.0 && stats[0].average_confidence <= 1.0);
    }

    #[tokio::test]
    async fn test_post_counts() {
        let db = test_db().await;
        assert_eq!(db.post_counts().await.unwrap(), (0, 0));

        db.create_post("you idiot", "b", &verdict_for("you idiot"))
            .await
            .unwrap();
        assert_eq!(db.post_counts().await.unwrap(), (1, 1));
    }
}
