//! Blogy auth core: token lifecycle and per-client admission control.
//!
//! `blogy-core` holds the parts of the blog backend with real state and
//! concurrency semantics. It knows nothing about HTTP; the `blogy-web` crate
//! wires it into an axum router.
//!
//! # Modules
//!
//! - [`auth`]: Token service (access/refresh pairs, rotation), password hashing,
//!   and the [`AuthGateway`].
//! - [`ratelimit`]: `governor` token buckets keyed by client, held in a
//!   [`RateLimitRegistry`].
//! - [`store`]: The [`UserStore`] seam to the CRUD layer, plus an in-memory
//!   implementation.
//! - [`validate`]: Registration/login input checks.
//! - [`user`]: User records and their public projection.
//! - [`error`]: [`AuthError`] and the narrower token/store errors.

pub mod auth;
pub mod error;
pub mod ratelimit;
pub mod store;
pub mod user;
pub mod validate;

pub use auth::{AuthGateway, PasswordHasher, TokenKind, TokenPair, TokenService};
pub use error::{AuthError, AuthResult, StoreError, TokenError};
pub use ratelimit::{Quota, RateLimitRegistry};
pub use store::{MemoryUserStore, UserStore};
pub use user::{NewUser, PublicUser, User, UserId};
