use crate::error::{StorageError, StorageResult};
use crate::models::{CardWithPatient, RfidCard};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Update applied to a registered card.
///
/// `label: None` keeps the current label; `patient_id` is always
/// written, so passing `None` unlinks the card from its patient.
#[derive(Debug, Clone, Default)]
pub struct CardUpdate {
    pub label: Option<String>,
    pub patient_id: Option<String>,
}

/// Repository trait for RFID card operations
pub trait CardRepository: Send + Sync {
    /// All cards with their linked patient name, newest first
    async fn list_with_patient(&self) -> StorageResult<Vec<CardWithPatient>>;

    /// Find a card by its uid
    async fn find_by_uid(&self, uid: &str) -> StorageResult<Option<RfidCard>>;

    /// Register a new card; `Duplicate` if the uid already exists
    async fn create(&self, card: &RfidCard) -> StorageResult<()>;

    /// Rename and/or re-link a card; returns whether a row was touched
    async fn update(&self, uid: &str, update: &CardUpdate) -> StorageResult<bool>;

    /// Soft-delete a card
    async fn deactivate(&self, uid: &str) -> StorageResult<bool>;

    /// Record a scan of this card; a miss (unregistered uid) is not an error
    async fn touch_last_scanned(&self, uid: &str, at: DateTime<Utc>) -> StorageResult<()>;
}

/// SQLite implementation of CardRepository
#[derive(Debug, Clone)]
pub struct SqliteCardRepository {
    pool: SqlitePool,
}

impl SqliteCardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CardRepository for SqliteCardRepository {
    async fn list_with_patient(&self) -> StorageResult<Vec<CardWithPatient>> {
        let cards = sqlx::query_as::<_, CardWithPatient>(
            r#"
            SELECT c.uid, c.label, c.patient_id, c.registered_at,
                   c.last_scanned, c.is_active,
                   p.name AS patient_name
            FROM rfid_cards c
            LEFT JOIN patients p ON c.patient_id = p.id
            ORDER BY c.registered_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    async fn find_by_uid(&self, uid: &str) -> StorageResult<Option<RfidCard>> {
        let card = sqlx::query_as::<_, RfidCard>(
            r#"
            SELECT uid, label, patient_id, registered_at, last_scanned, is_active
            FROM rfid_cards
            WHERE uid = ?
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    async fn create(&self, card: &RfidCard) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rfid_cards (uid, label, patient_id, registered_at,
                                    last_scanned, is_active)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&card.uid)
        .bind(&card.label)
        .bind(&card.patient_id)
        .bind(card.registered_at)
        .bind(card.last_scanned)
        .bind(card.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_sqlx(e, "card uid"))?;

        Ok(())
    }

    async fn update(&self, uid: &str, update: &CardUpdate) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE rfid_cards SET
                label = COALESCE(?, label),
                patient_id = ?
            WHERE uid = ?
            "#,
        )
        .bind(&update.label)
        .bind(&update.patient_id)
        .bind(uid)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate(&self, uid: &str) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE rfid_cards SET is_active = 0 WHERE uid = ?")
            .bind(uid)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_scanned(&self, uid: &str, at: DateTime<Utc>) -> StorageResult<()> {
        sqlx::query("UPDATE rfid_cards SET last_scanned = ? WHERE uid = ?")
            .bind(at)
            .bind(uid)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
