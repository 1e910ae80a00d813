use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::db::operations::progress::{complete_story, ProgressStoreError};
use crate::progression::{CompletionEvent, CompletionSummary};
use crate::response::json_error;
use crate::state::AppState;

#[derive(Serialize)]
struct CompleteResponse {
    success: bool,
    #[serde(flatten)]
    summary: CompletionSummary,
}

/// POST /api/stories/complete
///
/// Loads the authenticated user's progress record, applies the completion
/// event through the aggregator and persists the result, all inside one
/// per-user serialized transaction.
pub async fn complete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<CompletionEvent>,
) -> Response {
    if event.story_id.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "Invalid request body: storyId required",
        )
        .into_response();
    }

    let Some(token) = crate::auth::extract_token(&headers) else {
        return json_error(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "authentication token required",
        )
        .into_response();
    };

    let Some(proxy) = state.db_proxy() else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "database unavailable",
        )
        .into_response();
    };

    let user = match crate::auth::verify_request_token(proxy.as_ref(), &token).await {
        Ok(user) => user,
        Err(_) => {
            return json_error(
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "authentication failed",
            )
            .into_response();
        }
    };

    match complete_story(proxy.as_ref(), &user.id, &event, Utc::now()).await {
        Ok(summary) => Json(CompleteResponse {
            success: true,
            summary,
        })
        .into_response(),
        Err(ProgressStoreError::UserNotFound) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "user not found").into_response()
        }
        Err(ProgressStoreError::StoryNotFound) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "story not found").into_response()
        }
        Err(ProgressStoreError::Progression(err)) => {
            json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, user_id = %user.id, "story completion failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "failed to complete story",
            )
            .into_response()
        }
    }
}
