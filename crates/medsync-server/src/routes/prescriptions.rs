//! Prescriptions: issuance by doctors, verification by pharmacy.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use medsync_storage::repositories::{
    PrescriptionFilter, PrescriptionRepository, SqlitePrescriptionRepository,
};
use medsync_storage::{Prescription, PrescriptionDetail};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrescriptionRequest {
    pub patient_id: String,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub date_expires: Option<String>,
    pub notes: Option<String>,
}

/// Barcode printed on the prescription slip: `RX-` + 16 hex chars.
fn generate_barcode() -> String {
    let mut bytes = [0u8; 8];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    format!("RX-{}", hex::encode_upper(bytes))
}

#[derive(Debug, Serialize)]
pub struct PrescriptionList {
    pub prescriptions: Vec<Prescription>,
}

pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PrescriptionList>> {
    let prescriptions = SqlitePrescriptionRepository::new(state.db.pool().clone());
    let filter = PrescriptionFilter {
        patient_id: query.patient_id,
        doctor_id: query.doctor_id,
        status: query.status,
    };
    Ok(Json(PrescriptionList {
        prescriptions: prescriptions.search(&filter).await?,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreatePrescriptionRequest>,
) -> ApiResult<(StatusCode, Json<Prescription>)> {
    if !user.role.can_prescribe() {
        return Err(ApiError::Forbidden("Doctor role required"));
    }
    if body.medication.is_empty() || body.dosage.is_empty() || body.frequency.is_empty() {
        return Err(ApiError::bad_request(
            "medication, dosage and frequency are required",
        ));
    }

    let prescription = Prescription {
        id: Uuid::new_v4().to_string(),
        patient_id: body.patient_id,
        doctor_id: user.id,
        medication: body.medication,
        dosage: body.dosage,
        frequency: body.frequency,
        date_issued: Utc::now(),
        date_expires: body.date_expires,
        status: "active".to_string(),
        notes: body.notes,
        barcode: Some(generate_barcode()),
        verified_at: None,
        verified_by: None,
    };

    let prescriptions = SqlitePrescriptionRepository::new(state.db.pool().clone());
    prescriptions.create(&prescription).await?;

    tracing::info!(id = %prescription.id, "prescription issued");
    Ok((StatusCode::CREATED, Json(prescription)))
}

/// Lookup by prescription id or by barcode.
pub async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<Json<PrescriptionDetail>> {
    let prescriptions = SqlitePrescriptionRepository::new(state.db.pool().clone());
    let detail = prescriptions
        .find_detail(&key)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No prescription matching {key}")))?;
    Ok(Json(detail))
}

pub async fn verify(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<Json<PrescriptionDetail>> {
    if !user.role.can_verify() {
        return Err(ApiError::Forbidden("Pharmacy role required"));
    }

    let prescriptions = SqlitePrescriptionRepository::new(state.db.pool().clone());
    let detail = prescriptions
        .find_detail(&key)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No prescription matching {key}")))?;

    prescriptions
        .mark_verified(&detail.id, &user.id, Utc::now())
        .await?;

    let verified = prescriptions
        .find_detail(&detail.id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No prescription matching {key}")))?;

    tracing::info!(id = %verified.id, verified_by = %user.id, "prescription verified");
    Ok(Json(verified))
}
