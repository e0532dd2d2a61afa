//! Error types for `blogy-core`.
//!
//! Gateway operations return [`AuthResult<T>`]. The token service and the
//! user store have their own narrower error types which the gateway folds
//! into [`AuthError`] so that every failure reaches the HTTP layer as exactly
//! one kind.

use crate::auth::token::TokenKind;

/// Failure kinds surfaced by the auth gateway.
///
/// Each variant maps to exactly one HTTP status in the web frontend.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// A user with the same username or email is already registered.
    #[error("User already exists")]
    AlreadyExists,

    /// Unknown email or wrong password. The two cases are deliberately not
    /// distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired, or wrong-kind token.
    #[error("Unauthorized")]
    Unauthorized,

    /// The caller's rate-limit bucket is exhausted.
    #[error("Too many requests")]
    RateLimited,

    /// Store, signing, or hashing failure. The message is for logs only.
    #[error("internal failure: {0}")]
    Internal(String),
}

/// Convenience alias used by the gateway.
pub type AuthResult<T> = Result<T, AuthError>;

/// Reasons a token can be rejected or fail to be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, malformed encoding, or expired.
    #[error("token is invalid or expired")]
    Invalid,

    /// Well-formed and correctly signed, but of the wrong kind.
    #[error("expected {expected} token, found {found}")]
    KindMismatch { expected: TokenKind, found: TokenKind },

    /// Encoding the claims failed. Not caused by user input.
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::KindMismatch { .. } => AuthError::Unauthorized,
            TokenError::Signing(msg) => AuthError::Internal(msg),
        }
    }
}

/// Errors reported by a [`UserStore`](crate::store::UserStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint on username or email violated.
    #[error("duplicate user")]
    Duplicate,

    /// The backing store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AuthError::AlreadyExists,
            StoreError::Unavailable(msg) => AuthError::Internal(msg),
        }
    }
}
