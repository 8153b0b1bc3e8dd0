//! Login, registration, profile, and logout.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use medsync_auth::password::{hash_password, verify_password};
use medsync_core::UserRole;
use medsync_storage::User;
use medsync_storage::repositories::{SqliteUserRepository, UserRepository};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{CurrentUser, bearer_token};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

/// Public view of an account.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let users = SqliteUserRepository::new(state.db.pool().clone());

    let user = users
        .find_active_by_email(&body.email)
        .await?
        .filter(|u| verify_password(&state.secret_key, &body.password, &u.password_hash))
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    users.update_last_login(&user.id, Utc::now()).await?;
    let token = state.tokens.issue(&user.id).await?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let role: UserRole = body
        .role
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Unknown role: {}", body.role)))?;
    if !role.is_registerable() {
        return Err(ApiError::bad_request("Cannot self-register as admin"));
    }
    if body.email.is_empty() || body.password.is_empty() || body.name.is_empty() {
        return Err(ApiError::bad_request("email, password and name are required"));
    }

    let users = SqliteUserRepository::new(state.db.pool().clone());
    if users.email_exists(&body.email).await? {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: body.email,
        password_hash: hash_password(&state.secret_key, &body.password),
        name: body.name,
        role: role.as_str().to_string(),
        created_at: Utc::now(),
        last_login: None,
        is_active: true,
    };
    users.create(&user).await?;
    let token = state.tokens.issue(&user.id).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

pub async fn profile(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role.as_str().to_string(),
    })
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    // CurrentUser already proved the header exists and validates.
    if let Some(token) = bearer_token(&headers) {
        state.tokens.revoke(token).await?;
    }

    tracing::info!(user_id = %user.id, "user logged out");
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}
