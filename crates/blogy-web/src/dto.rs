use blogy_core::{PublicUser, TokenPair};
use serde::{Deserialize, Serialize};

pub const TOKEN_TYPE: &str = "Bearer";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `username` is accepted for compatibility but only `email` identifies the user.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

impl TokenResponse {
    pub fn new(pair: TokenPair, expires_in: u64) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: TOKEN_TYPE,
            expires_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogy_core::UserId;

    #[test]
    fn auth_response_is_flat_camel_case() {
        let body = AuthResponse {
            user: PublicUser {
                id: UserId(1),
                username: "alice".into(),
                email: "a@x.com".into(),
                created_at: 1_700_000_000,
            },
            tokens: TokenResponse::new(
                TokenPair {
                    access_token: "a".into(),
                    refresh_token: "r".into(),
                },
                3600,
            ),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresIn"], 3600);
        assert_eq!(json["user"]["id"], 1);
        assert!(json["user"].get("password_hash").is_none());
    }

    #[test]
    fn refresh_request_uses_camel_case() {
        let req: RefreshRequest = serde_json::from_str(r#"{"refreshToken":"t"}"#).unwrap();
        assert_eq!(req.refresh_token, "t");
        assert!(serde_json::from_str::<RefreshRequest>(r#"{"refresh_token":"t"}"#).is_err());
    }

    #[test]
    fn login_request_tolerates_username() {
        let body = r#"{"username":"alice","email":"a@x.com","password":"p"}"#;
        let req: LoginRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.email, "a@x.com");
    }
}
