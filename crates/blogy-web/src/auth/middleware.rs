use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use blogy_core::auth::bearer_token;
use blogy_core::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// Identity of the caller, resolved from `Authorization: Bearer <access token>`.
///
/// Rejection happens before the handler body runs.
pub struct AuthUser {
    pub id: UserId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Auth("No authorization header".to_string()))?;

        bearer_token(Some(auth_header))
            .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

        let id = state
            .gateway
            .authenticate(Some(auth_header))
            .map_err(|_| AppError::Auth("Invalid token".to_string()))?;

        Ok(AuthUser { id })
    }
}
