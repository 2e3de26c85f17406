//! JWT claims structure for admin tokens.

use serde::{Deserialize, Serialize};

/// Role granted to dashboard operators.
pub const ADMIN_ROLE: &str = "admin";

/// JWT claims embedded in admin access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// JWT ID (unique per token).
    pub jti: String,
    /// Subject (admin username).
    pub sub: String,
    /// Granted role.
    pub role: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl TokenClaims {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}
