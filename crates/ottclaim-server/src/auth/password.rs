//! Password hashing and admin credential checks using argon2id.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Hash a password using argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// The single configured admin account.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    username: String,
    password_hash: Option<String>,
}

impl AdminCredentials {
    pub const fn new(username: String, password_hash: Option<String>) -> Self {
        Self {
            username,
            password_hash,
        }
    }

    /// Whether a password hash is configured at all.
    pub const fn login_enabled(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Check a login attempt. Unknown usernames, wrong passwords and an
    /// unconfigured or malformed hash all yield `false`.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let Some(hash) = &self.password_hash else {
            return false;
        };
        let password_ok = verify_password(password, hash).unwrap_or(false);
        password_ok && username == self.username
    }
}
