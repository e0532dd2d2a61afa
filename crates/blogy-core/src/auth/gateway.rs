use std::sync::Arc;

use crate::auth::password::PasswordHasher;
use crate::auth::token::{unix_now, TokenKind, TokenPair, TokenService};
use crate::error::{AuthError, AuthResult};
use crate::store::UserStore;
use crate::user::{NewUser, PublicUser, User, UserId};

/// Hashed once per gateway so unknown-email logins pay for a real verify.
const DUMMY_PASSWORD: &str = "blogy-dummy-password";

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let header = header.ok_or(AuthError::Unauthorized)?;
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() && !token.contains(' ') => Ok(token),
        _ => Err(AuthError::Unauthorized),
    }
}

/// Orchestrates registration, login, refresh, and request authentication.
pub struct AuthGateway {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
    dummy_hash: String,
}

impl AuthGateway {
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        hasher: PasswordHasher,
    ) -> AuthResult<Self> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            tokens,
            hasher,
            dummy_hash,
        })
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates the account and returns it with a fresh token pair.
    ///
    /// Input must already have passed
    /// [`validate_registration`](crate::validate::validate_registration).
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<(User, TokenPair)> {
        if self.store.exists(username, email).await? {
            tracing::warn!("Registration rejected, user exists: {username} / {email}");
            return Err(AuthError::AlreadyExists);
        }

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))??;

        let user = self
            .store
            .insert(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                created_at: unix_now(),
            })
            .await?;

        let pair = self.tokens.issue_pair(user.id)?;
        tracing::info!("User registered: id={}, username={}", user.id, user.username);
        Ok((user, pair))
    }

    /// Email/password login. Unknown email and wrong password both come back
    /// as [`AuthError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<(User, TokenPair)> {
        let user = self.store.find_by_email(email).await?;

        let hash = user
            .as_ref()
            .map_or_else(|| self.dummy_hash.clone(), |u| u.password_hash.clone());
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let valid = tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = match user {
            Some(user) if valid => user,
            _ => {
                tracing::warn!("Failed login attempt for email: {email}");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let pair = self.tokens.issue_pair(user.id)?;
        tracing::info!("Login successful: id={}", user.id);
        Ok((user, pair))
    }

    /// Exchanges a refresh token for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let pair = self.tokens.refresh_pair(refresh_token).map_err(|e| {
            tracing::warn!("Refresh rejected: {e}");
            AuthError::from(e)
        })?;
        Ok(pair)
    }

    /// Resolves the caller's identity from the raw `Authorization` header.
    pub fn authenticate(&self, authorization: Option<&str>) -> AuthResult<UserId> {
        let token = bearer_token(authorization)?;
        self.tokens
            .parse_and_validate(token, TokenKind::Access)
            .map_err(|e| {
                tracing::warn!("Access token rejected: {e}");
                AuthError::from(e)
            })
    }

    /// Profile of an authenticated user. A deleted user is unauthorized.
    pub async fn current_user(&self, id: UserId) -> AuthResult<PublicUser> {
        let user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        Ok(user.sanitize())
    }
}
