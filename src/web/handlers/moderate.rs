// POST /api/moderate — evaluate a text without creating a post.
//
// The body is read as loose JSON rather than a typed struct so a missing or
// non-string `text` field maps to 400 (not a deserialization 422). An empty
// string is valid input — it goes through the pipeline like anything else.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::web::{api_error, AppState};

pub async fn moderate_text(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let Some(text) = body.get("text").and_then(|v| v.as_str()) else {
        return api_error(
            StatusCode::BAD_REQUEST,
            "Text field is required and must be a string",
        );
    };

    let verdict = state.pipeline.evaluate(text).await;
    Json(verdict).into_response()
}
