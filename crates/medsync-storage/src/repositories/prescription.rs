use crate::error::{StorageError, StorageResult};
use crate::models::{Prescription, PrescriptionDetail};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Optional filters for prescription queries.
#[derive(Debug, Clone, Default)]
pub struct PrescriptionFilter {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub status: Option<String>,
}

/// Repository trait for prescription operations
pub trait PrescriptionRepository: Send + Sync {
    /// Prescriptions matching the filter, newest first
    async fn search(&self, filter: &PrescriptionFilter) -> StorageResult<Vec<Prescription>>;

    /// All prescriptions for a patient
    async fn find_by_patient(&self, patient_id: &str) -> StorageResult<Vec<Prescription>>;

    /// Create a new prescription
    async fn create(&self, prescription: &Prescription) -> StorageResult<()>;

    /// Pharmacy lookup: by id or by barcode, joined with names
    async fn find_detail(&self, key: &str) -> StorageResult<Option<PrescriptionDetail>>;

    /// Mark a prescription as verified by the given user
    async fn mark_verified(
        &self,
        id: &str,
        verified_by: &str,
        at: DateTime<Utc>,
    ) -> StorageResult<()>;
}

/// SQLite implementation of PrescriptionRepository
#[derive(Debug, Clone)]
pub struct SqlitePrescriptionRepository {
    pool: SqlitePool,
}

impl SqlitePrescriptionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PrescriptionRepository for SqlitePrescriptionRepository {
    async fn search(&self, filter: &PrescriptionFilter) -> StorageResult<Vec<Prescription>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT id, patient_id, doctor_id, medication, dosage, frequency,
                   date_issued, date_expires, status, notes, barcode,
                   verified_at, verified_by
            FROM prescriptions
            WHERE 1=1
            "#,
        );

        if let Some(patient_id) = &filter.patient_id {
            query.push(" AND patient_id = ").push_bind(patient_id);
        }
        if let Some(doctor_id) = &filter.doctor_id {
            query.push(" AND doctor_id = ").push_bind(doctor_id);
        }
        if let Some(status) = &filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY date_issued DESC");

        let prescriptions = query
            .build_query_as::<Prescription>()
            .fetch_all(&self.pool)
            .await?;

        Ok(prescriptions)
    }

    async fn find_by_patient(&self, patient_id: &str) -> StorageResult<Vec<Prescription>> {
        let prescriptions = sqlx::query_as::<_, Prescription>(
            r#"
            SELECT id, patient_id, doctor_id, medication, dosage, frequency,
                   date_issued, date_expires, status, notes, barcode,
                   verified_at, verified_by
            FROM prescriptions
            WHERE patient_id = ?
            ORDER BY date_issued DESC
            "#,
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(prescriptions)
    }

    async fn create(&self, prescription: &Prescription) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO prescriptions (id, patient_id, doctor_id, medication,
                                       dosage, frequency, date_issued, date_expires,
                                       status, notes, barcode, verified_at, verified_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&prescription.id)
        .bind(&prescription.patient_id)
        .bind(&prescription.doctor_id)
        .bind(&prescription.medication)
        .bind(&prescription.dosage)
        .bind(&prescription.frequency)
        .bind(prescription.date_issued)
        .bind(&prescription.date_expires)
        .bind(&prescription.status)
        .bind(&prescription.notes)
        .bind(&prescription.barcode)
        .bind(prescription.verified_at)
        .bind(&prescription.verified_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_detail(&self, key: &str) -> StorageResult<Option<PrescriptionDetail>> {
        let detail = sqlx::query_as::<_, PrescriptionDetail>(
            r#"
            SELECT pr.id, pr.patient_id, pr.doctor_id, pr.medication, pr.dosage,
                   pr.frequency, pr.date_issued, pr.date_expires, pr.status,
                   pr.notes, pr.barcode, pr.verified_at, pr.verified_by,
                   pt.name AS patient_name,
                   u.name AS doctor_name
            FROM prescriptions pr
            JOIN patients pt ON pr.patient_id = pt.id
            JOIN users u ON pr.doctor_id = u.id
            WHERE pr.id = ? OR pr.barcode = ?
            "#,
        )
        .bind(key)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(detail)
    }

    async fn mark_verified(
        &self,
        id: &str,
        verified_by: &str,
        at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let result =
            sqlx::query("UPDATE prescriptions SET verified_at = ?, verified_by = ? WHERE id = ?")
                .bind(at)
                .bind(verified_by)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("prescription", "id", id));
        }
        Ok(())
    }
}
