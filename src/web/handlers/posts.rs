// Post endpoints — create (with automatic moderation), browse, report.
//
// POST /api/posts runs the pipeline before anything touches the database:
// a flagged verdict rejects the submission with 400 and the full verdict
// payload, so the client can show the user what triggered.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::web::{api_error, AppState};

/// POST /api/posts — moderate and create a post.
pub async fn create_post(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let Some(text) = body.get("text").and_then(|v| v.as_str()) else {
        return api_error(
            StatusCode::BAD_REQUEST,
            "Text field is required and must be a string",
        );
    };
    let author = body
        .get("author")
        .and_then(|v| v.as_str())
        .unwrap_or("Anonymous");

    let verdict = state.pipeline.evaluate(text).await;

    if verdict.flagged {
        // Reject with the verdict payload so the client can explain the
        // rejection. The post is still stored for the admin review queue;
        // a storage failure there only affects admins, so it is logged
        // rather than changing the response.
        if let Err(e) = state.db.create_post(text, author, &verdict).await {
            error!(error = %e, "Failed to store flagged post for review");
        }
        let mut payload = serde_json::to_value(&verdict).unwrap_or_default();
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("error".into(), "Content flagged".into());
        }
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    match state.db.create_post(text, author, &verdict).await {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to store post");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create post")
        }
    }
}

/// GET /api/posts — all approved posts, newest first.
pub async fn list_posts(State(state): State<AppState>) -> Response {
    match state.db.approved_posts().await {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to fetch posts");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch posts")
        }
    }
}

/// GET /api/posts/flagged — admin review queue.
pub async fn list_flagged(State(state): State<AppState>) -> Response {
    match state.db.flagged_posts().await {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to fetch flagged posts");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch posts")
        }
    }
}

/// GET /api/posts/reported — posts users have reported.
pub async fn list_reported(State(state): State<AppState>) -> Response {
    match state.db.reported_posts().await {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to fetch reported posts");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch posts")
        }
    }
}

/// GET /api/posts/{id} — a single post; bumps the view counter.
pub async fn get_post(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    if let Err(e) = state.db.record_view(id).await {
        error!(error = %e, post_id = id, "Failed to record view");
    }

    match state.db.get_post(id).await {
        Ok(Some(post)) => Json(post).into_response(),
        Ok(None) => api_error(StatusCode::NOT_FOUND, "Post not found"),
        Err(e) => {
            error!(error = %e, post_id = id, "Failed to fetch post");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch post")
        }
    }
}

/// POST /api/posts/{id}/report — flag a post for admin attention.
pub async fn report_post(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.db.report_post(id).await {
        Ok(true) => Json(serde_json::json!({ "reported": true })).into_response(),
        Ok(false) => api_error(StatusCode::NOT_FOUND, "Post not found"),
        Err(e) => {
            error!(error = %e, post_id = id, "Failed to report post");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to report post")
        }
    }
}
