use anyhow::Context;
use bytes::Bytes;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::media::{key_from_url, media_url, object_key, MediaKind};
use crate::schema::{JobSeekerProfile, JobSeekerProfileChanges};
use crate::state::AppState;

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

/// Stores the upload, points the profile at it and drops the object it replaces.
pub async fn upload_profile_media(
    st: &AppState,
    user_id: i32,
    kind: MediaKind,
    item: UploadItem,
) -> ApiResult<JobSeekerProfile> {
    let Some(ext) = kind.ext_from_mime(&item.content_type) else {
        return Err(ApiError::invalid(
            kind.as_str(),
            "content_type",
            format!("Unsupported {} type {}", kind.as_str(), item.content_type),
        ));
    };
    if item.body.is_empty() {
        return Err(ApiError::invalid(kind.as_str(), "empty", "Uploaded file is empty"));
    }

    let previous = st
        .store
        .get_user_with_profile(user_id)
        .await?
        .and_then(|u| u.job_seeker_profile)
        .and_then(|p| match kind {
            MediaKind::Audio => p.audio_presentation_url,
            MediaKind::Photo => p.profile_photo_url,
        });

    let key = object_key(user_id, kind, ext);
    let size = item.body.len();
    st.media
        .put_object(&key, item.body, &item.content_type)
        .await
        .with_context(|| format!("put_object {key}"))?;

    let url = media_url(&key);
    let mut changes = JobSeekerProfileChanges::default();
    match kind {
        MediaKind::Audio => changes.audio_presentation_url = Some(url),
        MediaKind::Photo => changes.profile_photo_url = Some(url),
    }
    let profile = match st
        .store
        .create_or_update_job_seeker_profile(user_id, changes)
        .await
    {
        Ok(profile) => profile,
        Err(err) => {
            if let Err(e) = st.media.delete_object(&key).await {
                warn!(error = %e, %key, "failed to delete orphaned media");
            }
            return Err(err.into());
        }
    };
    info!(user_id, kind = kind.as_str(), %key, size, "profile media uploaded");

    if let Some(old_key) = previous.as_deref().and_then(key_from_url) {
        if old_key != key {
            if let Err(e) = st.media.delete_object(old_key).await {
                warn!(error = %e, key = %old_key, "failed to delete replaced media");
            }
        }
    }

    Ok(profile)
}
