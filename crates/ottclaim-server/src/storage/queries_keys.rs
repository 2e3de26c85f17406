//! OTT key queries for the `OTTclaim` server.

use ottclaim_core::db::unix_timestamp;

use super::db::{ClaimDatabase, DatabaseError};
use super::models::{KeyInventory, KeyStatus, OttKey};

/// How strictly an available key must match the requested platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch<'a> {
    /// Platform name equal to the requested one.
    Exact(&'a str),
    /// Platform names containing one another, ignoring case.
    Fuzzy(&'a str),
    /// Any available key.
    Any,
}

/// Shared tail of the atomic assignment statement. The sub-select picks the
/// oldest matching key and the outer `status = 'available'` guard makes the
/// whole statement a no-op if another writer got there first.
const ASSIGN_SET: &str = "UPDATE ott_keys SET status = 'assigned', assigned_email = ?, assigned_date = ?, claim_id = ? \
     WHERE status = 'available' AND id = (SELECT id FROM ott_keys WHERE status = 'available'";
const ASSIGN_TAIL: &str = " ORDER BY created_at ASC, rowid ASC LIMIT 1) RETURNING *";

impl ClaimDatabase {
    /// Insert a key. Returns `false` when the code already exists.
    pub async fn insert_ott_key(
        &self,
        id: &str,
        activation_code: &str,
        platform: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO ott_keys (id, activation_code, platform, status, created_at) \
             VALUES (?, ?, ?, 'available', ?)",
        )
        .bind(id)
        .bind(activation_code)
        .bind(platform)
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically take one available key and assign it to a claim.
    ///
    /// Returns `None` when no key matches.
    pub async fn assign_available_key(
        &self,
        matching: KeyMatch<'_>,
        email: &str,
        claim_id: &str,
    ) -> Result<Option<OttKey>, DatabaseError> {
        let now = unix_timestamp();

        let key = match matching {
            KeyMatch::Exact(platform) => {
                sqlx::query_as::<_, OttKey>(&format!("{ASSIGN_SET} AND platform = ?{ASSIGN_TAIL}"))
                    .bind(email)
                    .bind(now)
                    .bind(claim_id)
                    .bind(platform)
                    .fetch_optional(self.pool())
                    .await?
            }
            KeyMatch::Fuzzy(platform) => {
                sqlx::query_as::<_, OttKey>(&format!(
                    "{ASSIGN_SET} AND (instr(lower(platform), lower(?)) > 0 OR instr(lower(?), lower(platform)) > 0){ASSIGN_TAIL}"
                ))
                .bind(email)
                .bind(now)
                .bind(claim_id)
                .bind(platform)
                .bind(platform)
                .fetch_optional(self.pool())
                .await?
            }
            KeyMatch::Any => {
                sqlx::query_as::<_, OttKey>(&format!("{ASSIGN_SET}{ASSIGN_TAIL}"))
                    .bind(email)
                    .bind(now)
                    .bind(claim_id)
                    .fetch_optional(self.pool())
                    .await?
            }
        };

        Ok(key)
    }

    /// Get a key by its redeemable code.
    pub async fn get_ott_key_by_code(&self, activation_code: &str) -> Result<OttKey, DatabaseError> {
        sqlx::query_as::<_, OttKey>("SELECT * FROM ott_keys WHERE activation_code = ?")
            .bind(activation_code)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("OTT key {activation_code}")))
    }

    /// List keys, newest first.
    pub async fn list_ott_keys(
        &self,
        status_filter: Option<KeyStatus>,
        platform_filter: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<OttKey>, DatabaseError> {
        let keys = sqlx::query_as::<_, OttKey>(
            "SELECT * FROM ott_keys WHERE (? IS NULL OR status = ?) AND (? IS NULL OR platform = ?) \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(status_filter)
        .bind(status_filter)
        .bind(platform_filter)
        .bind(platform_filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        Ok(keys)
    }

    /// Key counts grouped by platform and status.
    pub async fn key_inventory(&self) -> Result<Vec<KeyInventory>, DatabaseError> {
        let rows = sqlx::query_as::<_, KeyInventory>(
            "SELECT platform, status, COUNT(*) AS count FROM ott_keys \
             GROUP BY platform, status ORDER BY platform, status",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
