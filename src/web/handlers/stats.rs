// GET /api/moderation/stats — daily moderation statistics.
//
// Aggregated from stored posts on demand: per-day totals, flagged counts,
// average confidence, and triggered-category tallies.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct StatsParams {
    /// Window size in days (default 7)
    days: Option<u32>,
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Response {
    let days = params.days.unwrap_or(7);

    match state.db.moderation_stats(days).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to compute moderation stats");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch moderation stats",
            )
        }
    }
}
