//! Authentication: token pairs, password hashing, and the gateway that
//! composes them with the user store.

pub mod gateway;
pub mod password;
pub mod token;

pub use gateway::{bearer_token, AuthGateway};
pub use password::PasswordHasher;
pub use token::{
    TokenClaims, TokenKind, TokenPair, TokenService, DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL,
};
