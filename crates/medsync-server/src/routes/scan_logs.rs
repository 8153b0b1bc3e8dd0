//! Recent scan history.

use axum::Json;
use axum::extract::{Query, State};
use medsync_storage::ScanLogEntry;
use medsync_storage::repositories::{ScanLogRepository, SqliteScanLogRepository};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize, Default)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ScanLogList {
    pub logs: Vec<ScanLogEntry>,
}

pub async fn recent(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<ScanLogList>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let scan_logs = SqliteScanLogRepository::new(state.db.pool().clone());
    Ok(Json(ScanLogList {
        logs: scan_logs.recent(limit).await?,
    }))
}
