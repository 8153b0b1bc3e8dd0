//! Bearer-token authentication for REST handlers.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use medsync_auth::AuthUser;

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor that authenticates the request.
///
/// Pulls the `Authorization: Bearer <token>` header, resolves it
/// through the token store, and rejects with 401 on any failure. Add
/// it as a handler argument to protect a route.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(&parts.headers).ok_or(ApiError::Unauthorized("Missing bearer token"))?;
        let user = state.tokens.validate(token).await?;
        Ok(Self(user))
    }
}

/// Pulls the token out of an `Authorization: Bearer` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
