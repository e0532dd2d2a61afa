use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use blogy_core::validate::{validate_login, validate_refresh, validate_registration};
use blogy_core::AuthError;

use crate::dto::*;
use crate::error::AppError;
use crate::state::AppState;

fn expires_in(state: &AppState) -> u64 {
    state.gateway.tokens().access_ttl().as_secs()
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(body) = body?;
    validate_registration(&body.username, &body.email, &body.password)?;

    let (user, pair) = state
        .gateway
        .register(&body.username, &body.email, &body.password)
        .await?;

    Ok(Json(AuthResponse {
        user: user.sanitize(),
        tokens: TokenResponse::new(pair, expires_in(&state)),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(body) = body?;
    validate_login(&body.email, &body.password)?;

    let (user, pair) = state.gateway.login(&body.email, &body.password).await?;

    Ok(Json(AuthResponse {
        user: user.sanitize(),
        tokens: TokenResponse::new(pair, expires_in(&state)),
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(body) = body?;
    validate_refresh(&body.refresh_token)?;

    let pair = state
        .gateway
        .refresh(&body.refresh_token)
        .await
        .map_err(|e| match e {
            AuthError::Unauthorized => AppError::Auth("Invalid refresh token".to_string()),
            other => other.into(),
        })?;

    tracing::info!("Token pair refreshed");
    Ok(Json(TokenResponse::new(pair, expires_in(&state))))
}
