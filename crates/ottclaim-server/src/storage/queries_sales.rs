//! Sales record queries for the `OTTclaim` server.

use ottclaim_core::db::unix_timestamp;

use super::db::{ClaimDatabase, DatabaseError};
use super::models::{SalesRecord, SalesStatus};

impl ClaimDatabase {
    /// Insert a sales record. Returns `false` when the activation code already exists.
    pub async fn insert_sales_record(
        &self,
        id: &str,
        activation_code: &str,
        product: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO sales_records (id, activation_code, product, status, created_at) \
             VALUES (?, ?, ?, 'available', ?)",
        )
        .bind(id)
        .bind(activation_code)
        .bind(product)
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find a sales record by activation code.
    ///
    /// Tries an exact match first, then falls back to a case-insensitive one.
    pub async fn find_sales_record(
        &self,
        activation_code: &str,
    ) -> Result<Option<SalesRecord>, DatabaseError> {
        let exact = sqlx::query_as::<_, SalesRecord>(
            "SELECT * FROM sales_records WHERE activation_code = ?",
        )
        .bind(activation_code)
        .fetch_optional(self.pool())
        .await?;

        if exact.is_some() {
            return Ok(exact);
        }

        let folded = sqlx::query_as::<_, SalesRecord>(
            "SELECT * FROM sales_records WHERE activation_code = ? COLLATE NOCASE ORDER BY created_at LIMIT 1",
        )
        .bind(activation_code)
        .fetch_optional(self.pool())
        .await?;

        Ok(folded)
    }

    /// Atomically flip an available sales record to claimed.
    ///
    /// Returns `false` when the record was already claimed (or does not
    /// exist), so two concurrent claims on one code cannot both win.
    pub async fn claim_sales_record(&self, id: &str, claimed_by: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE sales_records SET status = 'claimed', claimed_by = ?, claimed_date = ? \
             WHERE id = ? AND status = 'available'",
        )
        .bind(claimed_by)
        .bind(unix_timestamp())
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Return a claimed sales record to the available pool.
    pub async fn release_sales_record(
        &self,
        activation_code: &str,
    ) -> Result<Option<SalesRecord>, DatabaseError> {
        let record = sqlx::query_as::<_, SalesRecord>(
            "UPDATE sales_records SET status = 'available', claimed_by = NULL, claimed_date = NULL \
             WHERE activation_code = ? COLLATE NOCASE AND status = 'claimed' RETURNING *",
        )
        .bind(activation_code)
        .fetch_optional(self.pool())
        .await?;

        Ok(record)
    }

    /// List sales records, newest first.
    pub async fn list_sales_records(
        &self,
        status_filter: Option<SalesStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<SalesRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, SalesRecord>(
            "SELECT * FROM sales_records WHERE (? IS NULL OR status = ?) \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(status_filter)
        .bind(status_filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        Ok(records)
    }

    /// Sales record counts grouped by status.
    pub async fn count_sales_by_status(&self) -> Result<Vec<(SalesStatus, i64)>, DatabaseError> {
        let rows = sqlx::query_as::<_, (SalesStatus, i64)>(
            "SELECT status, COUNT(*) FROM sales_records GROUP BY status ORDER BY status",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
