//! Input validation for the auth endpoints.
//!
//! These checks are preconditions: the HTTP layer runs them before handing
//! input to the gateway. Every failing field contributes one message and the
//! messages are joined with `", "`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AuthError, AuthResult};

pub const MIN_PASSWORD_LENGTH: usize = 8;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").unwrap());
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

pub fn username_is_valid(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

pub fn email_is_valid(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// At least 8 characters with an uppercase letter, a lowercase letter, a
/// digit, and a symbol or punctuation character.
pub fn password_is_strong(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(char::is_uppercase)
        && password.chars().any(char::is_lowercase)
        && password.chars().any(|c| c.is_ascii_digit())
        && password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

fn finish(errors: Vec<&str>) -> AuthResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(errors.join(", ")))
    }
}

pub fn validate_registration(username: &str, email: &str, password: &str) -> AuthResult<()> {
    let mut errors = Vec::new();

    if username.is_empty() {
        errors.push("username is required");
    } else if !username_is_valid(username) {
        errors.push(
            "username must be 3-20 characters long and can only contain \
             letters, numbers, and underscores",
        );
    }

    if email.is_empty() {
        errors.push("email is required");
    } else if !email_is_valid(email) {
        errors.push("invalid email format");
    }

    if password.is_empty() {
        errors.push("password is required");
    } else if !password_is_strong(password) {
        errors.push(
            "password must be at least 8 characters and contain at least one \
             uppercase letter, one lowercase letter, one number, and one symbol",
        );
    }

    finish(errors)
}

pub fn validate_login(email: &str, password: &str) -> AuthResult<()> {
    let mut errors = Vec::new();
    if email.is_empty() {
        errors.push("email is required");
    }
    if password.is_empty() {
        errors.push("password is required");
    }
    finish(errors)
}

pub fn validate_refresh(refresh_token: &str) -> AuthResult<()> {
    if refresh_token.is_empty() {
        return finish(vec!["refreshToken is required"]);
    }
    Ok(())
}
