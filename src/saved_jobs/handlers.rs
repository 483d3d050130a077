use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::SaveJobRequest;
use crate::{
    auth::JobSeekerUser,
    error::ApiResult,
    extract::{IdPath, ValidJson},
    schema::{NewSavedJob, SavedJob, SavedJobWithJob},
    state::AppState,
};

pub fn saved_job_routes() -> Router<AppState> {
    Router::new()
        .route("/saved-jobs", post(save_job))
        .route("/saved-jobs/:job_id", delete(remove_saved_job))
        .route("/job-seeker/saved-jobs", get(list_saved_jobs))
}

/// Idempotent: saving twice returns the first bookmark.
#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn save_job(
    State(state): State<AppState>,
    JobSeekerUser(user): JobSeekerUser,
    ValidJson(payload): ValidJson<SaveJobRequest>,
) -> ApiResult<(StatusCode, Json<SavedJob>)> {
    let saved = state
        .store
        .save_job(NewSavedJob {
            job_id: payload.job_id,
            job_seeker_id: user.id,
        })
        .await?;
    info!(saved_job_id = saved.id, job_id = saved.job_id, "job saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn remove_saved_job(
    State(state): State<AppState>,
    JobSeekerUser(user): JobSeekerUser,
    IdPath(job_id): IdPath,
) -> ApiResult<StatusCode> {
    if let Some(job_id) = job_id {
        state.store.remove_saved_job(job_id, user.id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_saved_jobs(
    State(state): State<AppState>,
    JobSeekerUser(user): JobSeekerUser,
) -> ApiResult<Json<Vec<SavedJobWithJob>>> {
    Ok(Json(state.store.get_saved_jobs_by_job_seeker_id(user.id).await?))
}
