use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::error::{AuthError, AuthResult};

/// Argon2id hashing with configurable cost.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher {
    /// `memory_kib` and `iterations` as in the Argon2 paper; one lane.
    pub fn new(memory_kib: u32, iterations: u32) -> AuthResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AuthError::Internal(format!("Invalid argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Salted hash in PHC string format.
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {e}")))?;

        Ok(hash.to_string())
    }

    /// The comparison itself is the library's constant-time check. An
    /// unparsable stored hash is reported as a mismatch.
    pub fn verify(&self, hash: &str, password: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(e) => {
                tracing::error!("Stored password hash is malformed: {e}");
                return false;
            }
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::new(1024, 1).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let hasher = cheap();
        let hash = hasher.hash("Aa1!aaaa").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(&hash, "Aa1!aaaa"));
        assert!(!hasher.verify(&hash, "wrongpw"));
    }

    #[test]
    fn same_password_gets_different_salts() {
        let hasher = cheap();
        let a = hasher.hash("Aa1!aaaa").unwrap();
        let b = hasher.hash("Aa1!aaaa").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!cheap().verify("not-a-phc-string", "anything"));
    }

    #[test]
    fn verify_uses_params_from_hash() {
        let strong = PasswordHasher::new(2048, 2).unwrap();
        let hash = strong.hash("Aa1!aaaa").unwrap();
        assert!(cheap().verify(&hash, "Aa1!aaaa"));
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(matches!(PasswordHasher::new(1, 1), Err(AuthError::Internal(_))));
    }
}
