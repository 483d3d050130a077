use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::services::{JwtKeys, TokenKind};
use crate::{
    error::ApiError,
    schema::{Role, User},
    state::AppState,
};

/// Authenticated caller, loaded from the store.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authenticated caller whose role is `employer`.
#[derive(Debug, Clone)]
pub struct EmployerUser(pub User);

/// Authenticated caller whose role is `job_seeker`.
#[derive(Debug, Clone)]
pub struct JobSeekerUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::unauthorized("Invalid or expired token")
        })?;
        if claims.kind != TokenKind::Access {
            return Err(ApiError::unauthorized("Access token required"));
        }
        let user_id = claims
            .user_id()
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

        match state.store.get_user(user_id).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!(user_id, "token for unknown user");
                Err(ApiError::unauthorized("Not authenticated"))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for EmployerUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Employer {
            warn!(user_id = user.id, "employer route called by job seeker");
            return Err(ApiError::forbidden("Access denied: employers only"));
        }
        Ok(EmployerUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for JobSeekerUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::JobSeeker {
            warn!(user_id = user.id, "job seeker route called by employer");
            return Err(ApiError::forbidden("Access denied: job seekers only"));
        }
        Ok(JobSeekerUser(user))
    }
}
