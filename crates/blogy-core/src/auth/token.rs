//! Signed access/refresh token pairs.
//!
//! Tokens are HS256 JWTs carrying the user id, a kind discriminator, and an
//! expiry. Nothing is stored server-side: a token is valid iff its signature
//! checks out, it has not expired, and its kind is the one the caller asked
//! for.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult, TokenError};
use crate::user::UserId;

pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "user_id")]
    pub sub: UserId,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Expiry, unix seconds.
    pub exp: u64,
    /// Issuance, unix seconds.
    pub iat: u64,
    /// Random token id; makes every issued token unique.
    pub jti: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and validates token pairs with one immutable signing secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl TokenService {
    /// Builds a service from the shared secret and the two token lifetimes.
    ///
    /// # Errors
    ///
    /// [`AuthError::Internal`] if the secret is empty or a TTL is zero. These
    /// are configuration mistakes and should stop the server from starting.
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::Internal("signing secret must not be empty".to_string()));
        }
        if access_ttl.as_secs() == 0 || refresh_ttl.as_secs() == 0 {
            return Err(AuthError::Internal("token TTLs must be at least one second".to_string()));
        }

        // Expiry is checked by hand against an explicit clock, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue_pair(&self, user: UserId) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(user, unix_now())
    }

    /// Issues an access and a refresh token for `user`, both dated `now`.
    pub fn issue_pair_at(&self, user: UserId, now: u64) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_at(user, TokenKind::Access, now)?,
            refresh_token: self.issue_at(user, TokenKind::Refresh, now)?,
        })
    }

    /// Signs a single token of the given kind.
    pub fn issue_at(&self, user: UserId, kind: TokenKind, now: u64) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = TokenClaims {
            sub: user,
            kind,
            exp: now.saturating_add(ttl.as_secs()),
            iat: now,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn parse_and_validate(
        &self,
        token: &str,
        expected: TokenKind,
    ) -> Result<UserId, TokenError> {
        self.parse_and_validate_at(token, expected, unix_now())
    }

    /// Verifies signature, expiry, and kind, returning the embedded user id.
    ///
    /// A token is live while `now < exp`; at `now == exp` it has expired.
    pub fn parse_and_validate_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: u64,
    ) -> Result<UserId, TokenError> {
        let claims = self.decode_at(token, now)?;
        if claims.kind != expected {
            return Err(TokenError::KindMismatch {
                expected,
                found: claims.kind,
            });
        }
        Ok(claims.sub)
    }

    pub fn refresh_pair(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        self.refresh_pair_at(refresh_token, unix_now())
    }

    /// Rotation: a valid refresh token buys a brand-new pair for the same user.
    ///
    /// The consumed token is not revoked; it stays valid until it expires.
    pub fn refresh_pair_at(&self, refresh_token: &str, now: u64) -> Result<TokenPair, TokenError> {
        let user = self.parse_and_validate_at(refresh_token, TokenKind::Refresh, now)?;
        self.issue_pair_at(user, now)
    }

    /// Decodes and checks signature and expiry, but not kind.
    pub fn decode_at(&self, token: &str, now: u64) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {e}");
            TokenError::Invalid
        })?;

        if now >= data.claims.exp {
            tracing::debug!("Token expired: exp={}, now={now}", data.claims.exp);
            return Err(TokenError::Invalid);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough";
    const NOW: u64 = 1_700_000_000;

    fn service() -> TokenService {
        TokenService::new(SECRET, DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL).unwrap()
    }

    #[test]
    fn access_token_round_trips_identity() {
        let svc = service();
        for id in [1, 42, i64::MAX] {
            let pair = svc.issue_pair_at(UserId(id), NOW).unwrap();
            let user = svc
                .parse_and_validate_at(&pair.access_token, TokenKind::Access, NOW)
                .unwrap();
            assert_eq!(user, UserId(id));
        }
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let svc = service();
        let pair = svc.issue_pair_at(UserId(5), NOW).unwrap();

        let err = svc
            .parse_and_validate_at(&pair.refresh_token, TokenKind::Access, NOW)
            .unwrap_err();
        assert_eq!(
            err,
            TokenError::KindMismatch {
                expected: TokenKind::Access,
                found: TokenKind::Refresh,
            }
        );
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        let svc = service();
        let pair = svc.issue_pair_at(UserId(5), NOW).unwrap();

        let err = svc
            .parse_and_validate_at(&pair.access_token, TokenKind::Refresh, NOW)
            .unwrap_err();
        assert!(matches!(err, TokenError::KindMismatch { .. }));
    }

    #[test]
    fn pair_shares_identity_but_not_kind_or_expiry() {
        let svc = service();
        let pair = svc.issue_pair_at(UserId(9), NOW).unwrap();

        let access = svc.decode_at(&pair.access_token, NOW).unwrap();
        let refresh = svc.decode_at(&pair.refresh_token, NOW).unwrap();

        assert_eq!(access.sub, refresh.sub);
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(access.iat, NOW);
        assert_eq!(refresh.iat, NOW);
        assert_eq!(access.exp, NOW + 3600);
        assert_eq!(refresh.exp, NOW + 7 * 24 * 3600);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let pair = svc.issue_pair_at(UserId(1), NOW).unwrap();

        let later = NOW + 2 * 3600;
        let err = svc
            .parse_and_validate_at(&pair.access_token, TokenKind::Access, later)
            .unwrap_err();
        assert_eq!(err, TokenError::Invalid);
    }

    #[test]
    fn expiry_boundary_both_sides() {
        let svc = service();
        let pair = svc.issue_pair_at(UserId(1), NOW).unwrap();
        let exp = NOW + 3600;

        assert!(svc
            .parse_and_validate_at(&pair.access_token, TokenKind::Access, exp - 1)
            .is_ok());
        assert_eq!(
            svc.parse_and_validate_at(&pair.access_token, TokenKind::Access, exp),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn expired_token_with_wrong_kind_reports_invalid_first() {
        let svc = service();
        let pair = svc.issue_pair_at(UserId(1), NOW).unwrap();

        let err = svc
            .parse_and_validate_at(&pair.access_token, TokenKind::Refresh, NOW + 3600)
            .unwrap_err();
        assert_eq!(err, TokenError::Invalid);
    }

    #[test]
    fn refresh_rotates_to_a_different_token() {
        let svc = service();
        let first = svc.issue_pair_at(UserId(3), NOW).unwrap();

        let second = svc.refresh_pair_at(&first.refresh_token, NOW).unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.access_token, second.access_token);

        // No revocation: both refresh tokens keep validating.
        for token in [&first.refresh_token, &second.refresh_token] {
            let user = svc
                .parse_and_validate_at(token, TokenKind::Refresh, NOW + 10)
                .unwrap();
            assert_eq!(user, UserId(3));
        }
    }

    #[test]
    fn refresh_with_access_token_fails() {
        let svc = service();
        let pair = svc.issue_pair_at(UserId(3), NOW).unwrap();

        let err = svc.refresh_pair_at(&pair.access_token, NOW).unwrap_err();
        assert!(matches!(err, TokenError::KindMismatch { .. }));
    }

    #[test]
    fn refresh_with_expired_refresh_token_fails() {
        let svc = service();
        let pair = svc.issue_pair_at(UserId(3), NOW).unwrap();

        let after_a_week = NOW + 7 * 24 * 3600;
        assert_eq!(
            svc.refresh_pair_at(&pair.refresh_token, after_a_week),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let svc = service();
        let other = TokenService::new(
            "a-completely-different-secret-value",
            DEFAULT_ACCESS_TTL,
            DEFAULT_REFRESH_TTL,
        )
        .unwrap();
        let pair = other.issue_pair_at(UserId(1), NOW).unwrap();

        assert_eq!(
            svc.parse_and_validate_at(&pair.access_token, TokenKind::Access, NOW),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn tampered_token_is_invalid() {
        let svc = service();
        let victim = svc.issue_at(UserId(1), TokenKind::Access, NOW).unwrap();
        let attacker = svc.issue_at(UserId(999), TokenKind::Access, NOW).unwrap();

        // Attacker's payload under the victim's signature.
        let mut parts: Vec<&str> = victim.split('.').collect();
        let forged_payload = attacker.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        let tampered = parts.join(".");

        assert_eq!(
            svc.parse_and_validate_at(&tampered, TokenKind::Access, NOW),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn garbage_and_empty_tokens_are_invalid() {
        let svc = service();
        for token in ["", "invalid.jwt.token", "not-a-jwt"] {
            assert_eq!(
                svc.parse_and_validate_at(token, TokenKind::Access, NOW),
                Err(TokenError::Invalid)
            );
        }
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let svc = service();
        let claims = TokenClaims {
            sub: UserId(1),
            kind: TokenKind::Access,
            exp: NOW + 60,
            iat: NOW,
            jti: "j".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            svc.parse_and_validate_at(&token, TokenKind::Access, NOW),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn wire_claims_use_expected_field_names() {
        let svc = service();
        let token = svc.issue_at(UserId(12), TokenKind::Refresh, NOW).unwrap();
        let claims = svc.decode_at(&token, NOW).unwrap();
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["user_id"], 12);
        assert_eq!(json["type"], "refresh");
        assert_eq!(json["exp"], NOW + 7 * 24 * 3600);
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let result = TokenService::new("", DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL);
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn zero_ttl_is_a_configuration_error() {
        let result = TokenService::new(SECRET, Duration::ZERO, DEFAULT_REFRESH_TTL);
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn wall_clock_variants_accept_fresh_tokens() {
        let svc = service();
        let pair = svc.issue_pair(UserId(8)).unwrap();
        assert_eq!(
            svc.parse_and_validate(&pair.access_token, TokenKind::Access),
            Ok(UserId(8))
        );
        let rotated = svc.refresh_pair(&pair.refresh_token).unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);
    }

    #[test]
    fn huge_ttl_saturates_expiry() {
        let forever = Duration::from_secs(u64::MAX);
        let svc = TokenService::new(SECRET, DEFAULT_ACCESS_TTL, forever).unwrap();
        let token = svc.issue_at(UserId(3), TokenKind::Refresh, NOW).unwrap();

        let claims = svc.decode_at(&token, NOW).unwrap();
        assert_eq!(claims.exp, u64::MAX);
        assert_eq!(
            svc.parse_and_validate_at(&token, TokenKind::Refresh, NOW),
            Ok(UserId(3))
        );
    }
}
