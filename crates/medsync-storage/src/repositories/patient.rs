use crate::error::{StorageError, StorageResult};
use crate::models::Patient;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Partial update for a patient record.
///
/// `None` fields keep their current value (COALESCE semantics), so a
/// client can PUT only the fields it wants to change.
#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub rfid_uid: Option<String>,
}

/// Repository trait for patient record operations
pub trait PatientRepository: Send + Sync {
    /// All patients, ordered by name
    async fn list_all(&self) -> StorageResult<Vec<Patient>>;

    /// Find by internal id or by linked RFID uid
    async fn find_by_id_or_rfid(&self, key: &str) -> StorageResult<Option<Patient>>;

    /// Create a new patient
    async fn create(&self, patient: &Patient) -> StorageResult<()>;

    /// Apply a partial update; returns whether a row was touched
    async fn update(
        &self,
        id: &str,
        update: &PatientUpdate,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<bool>;
}

/// SQLite implementation of PatientRepository
#[derive(Debug, Clone)]
pub struct SqlitePatientRepository {
    pool: SqlitePool,
}

impl SqlitePatientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PatientRepository for SqlitePatientRepository {
    async fn list_all(&self) -> StorageResult<Vec<Patient>> {
        let patients = sqlx::query_as::<_, Patient>(
            r#"
            SELECT id, name, date_of_birth, gender, contact, email,
                   address, rfid_uid, created_at, updated_at
            FROM patients
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(patients)
    }

    async fn find_by_id_or_rfid(&self, key: &str) -> StorageResult<Option<Patient>> {
        let patient = sqlx::query_as::<_, Patient>(
            r#"
            SELECT id, name, date_of_birth, gender, contact, email,
                   address, rfid_uid, created_at, updated_at
            FROM patients
            WHERE id = ? OR rfid_uid = ?
            "#,
        )
        .bind(key)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(patient)
    }

    async fn create(&self, patient: &Patient) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO patients (id, name, date_of_birth, gender, contact,
                                  email, address, rfid_uid, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&patient.id)
        .bind(&patient.name)
        .bind(&patient.date_of_birth)
        .bind(&patient.gender)
        .bind(&patient.contact)
        .bind(&patient.email)
        .bind(&patient.address)
        .bind(&patient.rfid_uid)
        .bind(patient.created_at)
        .bind(patient.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_sqlx(e, "patient rfid uid"))?;

        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        update: &PatientUpdate,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE patients SET
                name = COALESCE(?, name),
                date_of_birth = COALESCE(?, date_of_birth),
                gender = COALESCE(?, gender),
                contact = COALESCE(?, contact),
                email = COALESCE(?, email),
                address = COALESCE(?, address),
                rfid_uid = COALESCE(?, rfid_uid),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.date_of_birth)
        .bind(&update.gender)
        .bind(&update.contact)
        .bind(&update.email)
        .bind(&update.address)
        .bind(&update.rfid_uid)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
