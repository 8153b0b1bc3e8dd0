//! Patient records.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use medsync_storage::repositories::{
    PatientRepository, PatientUpdate, PrescriptionRepository, SqlitePatientRepository,
    SqlitePrescriptionRepository,
};
use medsync_storage::{Patient, Prescription};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub rfid_uid: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub rfid_uid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PatientList {
    pub patients: Vec<Patient>,
}

pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<PatientList>> {
    let patients = SqlitePatientRepository::new(state.db.pool().clone());
    Ok(Json(PatientList {
        patients: patients.list_all().await?,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(body): Json<CreatePatientRequest>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    if body.name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let now = Utc::now();
    let patient = Patient {
        id: Uuid::new_v4().to_string(),
        name: body.name,
        date_of_birth: body.date_of_birth,
        gender: body.gender,
        contact: body.contact,
        email: body.email,
        address: body.address,
        rfid_uid: body.rfid_uid,
        created_at: now,
        updated_at: now,
    };

    let patients = SqlitePatientRepository::new(state.db.pool().clone());
    patients.create(&patient).await?;

    Ok((StatusCode::CREATED, Json(patient)))
}

/// A patient together with everything prescribed to them.
#[derive(Debug, Serialize)]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub prescriptions: Vec<Prescription>,
}

/// Lookup by patient id or by the UID of a linked RFID card.
pub async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<Json<PatientDetail>> {
    let patients = SqlitePatientRepository::new(state.db.pool().clone());
    let patient = patients
        .find_by_id_or_rfid(&key)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No patient matching {key}")))?;

    let prescriptions = SqlitePrescriptionRepository::new(state.db.pool().clone())
        .find_by_patient(&patient.id)
        .await?;

    Ok(Json(PatientDetail {
        patient,
        prescriptions,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdatePatientRequest>,
) -> ApiResult<Json<Patient>> {
    let patients = SqlitePatientRepository::new(state.db.pool().clone());

    let changes = PatientUpdate {
        name: body.name,
        date_of_birth: body.date_of_birth,
        gender: body.gender,
        contact: body.contact,
        email: body.email,
        address: body.address,
        rfid_uid: body.rfid_uid,
    };

    if !patients.update(&id, &changes, Utc::now()).await? {
        return Err(ApiError::not_found(format!("No patient with id {id}")));
    }

    let patient = patients
        .find_by_id_or_rfid(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No patient with id {id}")))?;
    Ok(Json(patient))
}
