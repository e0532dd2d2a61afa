use axum::extract::State;
use axum::Json;

use crate::auth::middleware::AuthUser;
use crate::dto::UserResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Profile of the authenticated caller.
pub async fn me(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.gateway.current_user(user.id).await?;
    Ok(Json(UserResponse { user }))
}
