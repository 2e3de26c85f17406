//! JWT token issuance and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

use ottclaim_core::db::unix_timestamp;

use super::claims::{ADMIN_ROLE, TokenClaims};

/// Manages admin JWT creation and validation.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtManager {
    /// Create a new `JwtManager` with the given secret and token lifetime.
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Issue an admin access token. Returns the token and its lifetime in seconds.
    pub fn issue_admin_token(&self, username: &str) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        let now = unix_timestamp();

        let claims = TokenClaims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: username.to_string(),
            role: ADMIN_ROLE.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok((token, self.ttl_secs))
    }

    /// Validate a token and return its claims.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}
