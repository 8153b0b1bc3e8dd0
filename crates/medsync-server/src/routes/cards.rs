//! RFID card registration and management.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use medsync_protocol::ServerMessage;
use medsync_storage::repositories::{CardRepository, CardUpdate, SqliteCardRepository};
use medsync_storage::{CardWithPatient, RfidCard};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCardRequest {
    pub uid: String,
    pub label: String,
    pub patient_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    pub label: Option<String>,
    pub patient_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CardList {
    pub cards: Vec<CardWithPatient>,
}

pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<CardList>> {
    let cards = SqliteCardRepository::new(state.db.pool().clone());
    Ok(Json(CardList {
        cards: cards.list_with_patient().await?,
    }))
}

/// Registers a card and tells every websocket client about it, so an
/// open registration view refreshes without polling.
pub async fn register(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(body): Json<RegisterCardRequest>,
) -> ApiResult<(StatusCode, Json<RfidCard>)> {
    if body.uid.is_empty() {
        return Err(ApiError::bad_request("uid is required"));
    }

    let card = RfidCard {
        uid: body.uid,
        label: body.label,
        patient_id: body.patient_id,
        registered_at: Utc::now(),
        last_scanned: None,
        is_active: true,
    };

    let cards = SqliteCardRepository::new(state.db.pool().clone());
    cards.create(&card).await?;

    state
        .bridge
        .broadcast(ServerMessage::CardRegistered {
            uid: card.uid.clone(),
            label: card.label.clone(),
            patient_id: card.patient_id.clone(),
        })
        .await;

    tracing::info!(uid = %card.uid, "rfid card registered");
    Ok((StatusCode::CREATED, Json(card)))
}

/// Relabels or relinks a card. Omitting `patientId` unlinks it.
pub async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(uid): Path<String>,
    Json(body): Json<UpdateCardRequest>,
) -> ApiResult<Json<RfidCard>> {
    let cards = SqliteCardRepository::new(state.db.pool().clone());

    let changes = CardUpdate {
        label: body.label,
        patient_id: body.patient_id,
    };
    if !cards.update(&uid, &changes).await? {
        return Err(ApiError::not_found(format!("No card with uid {uid}")));
    }

    let card = cards
        .find_by_uid(&uid)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No card with uid {uid}")))?;
    Ok(Json(card))
}

/// Soft delete: the card stops resolving but its scan history stays.
pub async fn deactivate(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(uid): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let cards = SqliteCardRepository::new(state.db.pool().clone());
    if !cards.deactivate(&uid).await? {
        return Err(ApiError::not_found(format!("No card with uid {uid}")));
    }
    Ok(Json(serde_json::json!({ "message": "Card deactivated" })))
}
