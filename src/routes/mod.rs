mod health;
mod stories;
mod users;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/api/stories/complete", post(stories::complete))
        .route("/api/users/me/progress", get(users::progress))
        .route("/api/achievements", get(users::achievements));

    app = app.nest("/health", health::router());
    app = app.nest("/api/health", health::router());

    app.fallback(fallback_handler).with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found").into_response()
}
