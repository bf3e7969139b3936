//! Drive item ledger repository implementation.
//!
//! All writes are keyed upserts: concurrent calls for the same item id
//! converge on one row, and share recording is a set-union insert, so no
//! read-modify-write happens in application memory.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use driveport_core::error::{AppError, ErrorKind};
use driveport_core::result::AppResult;
use driveport_entity::ledger::model::{DriveItemRecord, UpsertUploader};

/// Database row for `drive_items`, without the aggregated share set.
#[derive(Debug, Clone, sqlx::FromRow)]
struct LedgerRow {
    item_id: String,
    uploader_email: Option<String>,
    uploader_account_id: Option<Uuid>,
    auto_shared_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LedgerRow {
    fn into_record(self, shared_with: Vec<Uuid>) -> DriveItemRecord {
        DriveItemRecord {
            item_id: self.item_id,
            uploader_email: self.uploader_email,
            uploader_account_id: self.uploader_account_id,
            auto_shared_at: self.auto_shared_at,
            shared_with,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for the per-item metadata ledger.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Create a new ledger repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create or update the uploader fields for an item.
    ///
    /// An uploader already on the record is preserved: the upload path
    /// writes first and later inference must not overwrite it. Repeated
    /// calls with the same data are no-ops.
    pub async fn upsert_uploader(&self, data: &UpsertUploader) -> AppResult<DriveItemRecord> {
        let row = sqlx::query_as::<_, LedgerRow>(
            "INSERT INTO drive_items (item_id, uploader_email, uploader_account_id) \
             VALUES ($1, LOWER($2), $3) \
             ON CONFLICT (item_id) DO UPDATE SET \
             uploader_email = COALESCE(drive_items.uploader_email, EXCLUDED.uploader_email), \
             uploader_account_id = COALESCE(drive_items.uploader_account_id, EXCLUDED.uploader_account_id), \
             updated_at = NOW() \
             RETURNING *",
        )
        .bind(&data.item_id)
        .bind(&data.uploader_email)
        .bind(data.uploader_account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert uploader", e))?;

        let shared_with = self.shares_for(&row.item_id).await?;
        Ok(row.into_record(shared_with))
    }

    /// Bulk uploader upsert for backfilling many ids at once.
    pub async fn upsert_uploader_many(&self, entries: &[UpsertUploader]) -> AppResult<()> {
        for entry in entries {
            self.upsert_uploader(entry).await?;
        }
        Ok(())
    }

    /// Record explicit share recipients for an item (set-union, idempotent).
    pub async fn record_share(&self, item_id: &str, recipient_ids: &[Uuid]) -> AppResult<()> {
        if recipient_ids.is_empty() {
            return Ok(());
        }

        // The parent row may not exist yet for items shared before any
        // upload metadata was recorded.
        sqlx::query("INSERT INTO drive_items (item_id) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to ensure ledger row", e)
            })?;

        sqlx::query(
            "INSERT INTO drive_item_shares (item_id, account_id) \
             SELECT $1, UNNEST($2::uuid[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(item_id)
        .bind(recipient_ids)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record share", e))?;

        Ok(())
    }

    /// Stamp the auto-share timestamp for an item.
    pub async fn mark_auto_shared(&self, item_id: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO drive_items (item_id, auto_shared_at) VALUES ($1, NOW()) \
             ON CONFLICT (item_id) DO UPDATE SET auto_shared_at = NOW(), updated_at = NOW()",
        )
        .bind(item_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark auto-shared", e))?;
        Ok(())
    }

    /// Fetch the ledger record for an item, if any.
    pub async fn get(&self, item_id: &str) -> AppResult<Option<DriveItemRecord>> {
        let row = sqlx::query_as::<_, LedgerRow>("SELECT * FROM drive_items WHERE item_id = $1")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find ledger record", e)
            })?;

        match row {
            Some(row) => {
                let shared_with = self.shares_for(&row.item_id).await?;
                Ok(Some(row.into_record(shared_with)))
            }
            None => Ok(None),
        }
    }

    /// Fetch ledger records for many item ids in two round trips.
    pub async fn get_many(&self, item_ids: &[String]) -> AppResult<Vec<DriveItemRecord>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows =
            sqlx::query_as::<_, LedgerRow>("SELECT * FROM drive_items WHERE item_id = ANY($1)")
                .bind(item_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to find ledger records", e)
                })?;

        let shares: Vec<(String, Uuid)> = sqlx::query_as(
            "SELECT item_id, account_id FROM drive_item_shares WHERE item_id = ANY($1)",
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load share sets", e))?;

        let mut grouped: HashMap<String, Vec<Uuid>> = HashMap::new();
        for (item_id, account_id) in shares {
            grouped.entry(item_id).or_default().push(account_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let shared_with = grouped.remove(&row.item_id).unwrap_or_default();
                row.into_record(shared_with)
            })
            .collect())
    }

    /// Delete the record for an item. Deleting a nonexistent record is not
    /// an error; returns whether a row was removed.
    pub async fn delete(&self, item_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM drive_items WHERE item_id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete ledger record", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Load the explicit-share set for one item.
    async fn shares_for(&self, item_id: &str) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT account_id FROM drive_item_shares WHERE item_id = $1 ORDER BY granted_at",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load share set", e))
    }
}
