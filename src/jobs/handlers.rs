use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument};

use super::dto::{CreateJobRequest, JobQuery};
use crate::{
    auth::EmployerUser,
    error::{ApiError, ApiResult},
    extract::{IdPath, ValidJson},
    schema::{Job, JobWithEmployer},
    state::AppState,
};

pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/:id", get(get_job))
        .route("/employer/jobs", get(list_employer_jobs).post(create_job))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn create_job(
    State(state): State<AppState>,
    EmployerUser(user): EmployerUser,
    ValidJson(payload): ValidJson<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    let job = state.store.create_job(user.id, payload.into()).await?;
    info!(job_id = job.id, title = %job.title, "job posted");
    Ok((StatusCode::CREATED, Json(job)))
}

#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> ApiResult<Json<Vec<JobWithEmployer>>> {
    let Some(filters) = query.into_filters() else {
        debug!("unknown type or status filter; nothing matches");
        return Ok(Json(Vec::new()));
    };
    let jobs = state.store.get_jobs(&filters).await?;
    Ok(Json(jobs))
}

/// Counts the view, then returns the job as stored after the increment.
#[instrument(skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<JobWithEmployer>> {
    let Some(id) = id else {
        return Err(ApiError::not_found("Job not found"));
    };
    if state.store.get_job_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("Job not found"));
    }
    state.store.increment_job_views(id).await?;
    let job = state
        .store
        .get_job_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_employer_jobs(
    State(state): State<AppState>,
    EmployerUser(user): EmployerUser,
) -> ApiResult<Json<Vec<Job>>> {
    Ok(Json(state.store.get_jobs_by_employer_id(user.id).await?))
}
