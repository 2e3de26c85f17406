//! Admin authentication.
//!
//! Admins log in with a configured username and argon2 password hash and
//! receive a short-lived JWT that every admin and automation route checks.

pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::TokenClaims;
pub use jwt::JwtManager;
pub use password::AdminCredentials;
