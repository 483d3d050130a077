use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::instrument;

use super::MediaObject;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn media_routes() -> Router<AppState> {
    Router::new().route("/media/*key", get(get_media))
}

/// 307 to a presigned URL, or the bytes themselves for in-memory objects.
#[instrument(skip(state))]
pub async fn get_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Response> {
    if key.split('/').any(|seg| seg == "..") {
        return Err(ApiError::bad_request("Invalid media key"));
    }
    match state.media.open(&key).await? {
        Some(MediaObject::Presigned(url)) => Ok(Redirect::temporary(&url).into_response()),
        Some(MediaObject::Inline { body, content_type }) => {
            Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
        }
        None => Err(ApiError::not_found("Media not found")),
    }
}
