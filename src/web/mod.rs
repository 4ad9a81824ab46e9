// Web server — Axum-based JSON API.
//
// This is the HTTP boundary around the moderation pipeline: submit a text
// for a standalone verdict, create posts (flagged posts are rejected with
// the verdict payload), browse approved posts, report posts, and read the
// admin review queues and daily statistics.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::db::Database;
use crate::moderation::ModerationPipeline;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub pipeline: Arc<ModerationPipeline>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(
    db: Arc<dyn Database>,
    pipeline: Arc<ModerationPipeline>,
    bind: &str,
    port: u16,
) -> Result<()> {
    let state = AppState { db, pipeline };
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Gatepost API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router. Public so integration tests can drive it with
/// `tower::ServiceExt::oneshot` without binding a socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/moderate", post(handlers::moderate::moderate_text))
        .route(
            "/api/posts",
            post(handlers::posts::create_post).get(handlers::posts::list_posts),
        )
        .route("/api/posts/flagged", get(handlers::posts::list_flagged))
        .route("/api/posts/reported", get(handlers::posts::list_reported))
        .route("/api/posts/{id}", get(handlers::posts::get_post))
        .route("/api/posts/{id}/report", post(handlers::posts::report_post))
        .route("/api/moderation/stats", get(handlers::stats::get_stats))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Deployment health check — always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
