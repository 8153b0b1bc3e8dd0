use crate::error::StorageResult;
use crate::models::ScanLogEntry;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Repository trait for scan log operations
pub trait ScanLogRepository: Send + Sync {
    /// Append one scan observation; returns the new row id
    async fn insert(&self, rfid_uid: &str, scanned_at: DateTime<Utc>) -> StorageResult<i64>;

    /// Most recent scans joined with card label and patient name
    async fn recent(&self, limit: i64) -> StorageResult<Vec<ScanLogEntry>>;
}

/// SQLite implementation of ScanLogRepository
#[derive(Debug, Clone)]
pub struct SqliteScanLogRepository {
    pool: SqlitePool,
}

impl SqliteScanLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ScanLogRepository for SqliteScanLogRepository {
    async fn insert(&self, rfid_uid: &str, scanned_at: DateTime<Utc>) -> StorageResult<i64> {
        let result = sqlx::query("INSERT INTO scan_logs (rfid_uid, scanned_at) VALUES (?, ?)")
            .bind(rfid_uid)
            .bind(scanned_at)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn recent(&self, limit: i64) -> StorageResult<Vec<ScanLogEntry>> {
        let entries = sqlx::query_as::<_, ScanLogEntry>(
            r#"
            SELECT s.id, s.rfid_uid, s.scanned_at, s.action, s.details,
                   c.label,
                   p.name AS patient_name
            FROM scan_logs s
            LEFT JOIN rfid_cards c ON s.rfid_uid = c.uid
            LEFT JOIN patients p ON c.patient_id = p.id
            ORDER BY s.scanned_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
