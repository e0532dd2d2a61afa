mod auth_handlers;
pub mod users;


use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// Registration, login, and refresh. No bearer token required.
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login))
        .route("/refresh", post(auth_handlers::refresh))
}

/// Routes whose handlers take an [`AuthUser`](crate::auth::middleware::AuthUser).
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/me", get(users::me))
}

pub async fn health(headers: HeaderMap) -> Json<HealthResponse> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    Json(HealthResponse {
        status: "ok",
        timestamp,
        request_id,
    })
}
