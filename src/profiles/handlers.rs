use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{EmployerProfileRequest, JobSeekerProfileRequest};
use super::services::{upload_profile_media, UploadItem};
use crate::{
    auth::{EmployerUser, JobSeekerUser},
    error::{ApiError, ApiResult},
    extract::ValidJson,
    media::MediaKind,
    schema::{EmployerProfile, JobSeekerProfile},
    state::AppState,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/job-seeker/profile", post(upsert_job_seeker_profile))
        .route("/employer/profile", post(upsert_employer_profile))
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/job-seeker/profile/audio", post(upload_audio))
        .route("/job-seeker/profile/photo", post(upload_photo))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn upsert_job_seeker_profile(
    State(state): State<AppState>,
    JobSeekerUser(user): JobSeekerUser,
    ValidJson(payload): ValidJson<JobSeekerProfileRequest>,
) -> ApiResult<(StatusCode, Json<JobSeekerProfile>)> {
    let changes = payload.into_changes()?;
    let profile = state
        .store
        .create_or_update_job_seeker_profile(user.id, changes)
        .await?;
    info!(
        profile_id = profile.id,
        completion = profile.completion_percentage,
        "job seeker profile saved"
    );
    Ok((StatusCode::CREATED, Json(profile)))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn upsert_employer_profile(
    State(state): State<AppState>,
    EmployerUser(user): EmployerUser,
    ValidJson(payload): ValidJson<EmployerProfileRequest>,
) -> ApiResult<(StatusCode, Json<EmployerProfile>)> {
    let profile = state
        .store
        .create_or_update_employer_profile(user.id, payload.into())
        .await?;
    info!(profile_id = profile.id, "employer profile saved");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// POST /job-seeker/profile/audio, multipart field `audio`.
#[instrument(skip(state, user, mp), fields(user_id = user.id))]
pub async fn upload_audio(
    State(state): State<AppState>,
    JobSeekerUser(user): JobSeekerUser,
    mp: Multipart,
) -> ApiResult<(StatusCode, Json<JobSeekerProfile>)> {
    let item = read_file_field(mp, "audio").await?;
    let profile = upload_profile_media(&state, user.id, MediaKind::Audio, item).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// POST /job-seeker/profile/photo, multipart field `photo`.
#[instrument(skip(state, user, mp), fields(user_id = user.id))]
pub async fn upload_photo(
    State(state): State<AppState>,
    JobSeekerUser(user): JobSeekerUser,
    mp: Multipart,
) -> ApiResult<(StatusCode, Json<JobSeekerProfile>)> {
    let item = read_file_field(mp, "photo").await?;
    let profile = upload_profile_media(&state, user.id, MediaKind::Photo, item).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn read_file_field(mut mp: Multipart, name: &str) -> ApiResult<UploadItem> {
    while let Some(field) = mp.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(name) {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadItem { body, content_type });
    }
    Err(ApiError::invalid(name, "required", format!("{name} file is required")))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::bad_request("File too large (max 10 MiB)")
    } else {
        ApiError::bad_request(e.body_text())
    }
}
