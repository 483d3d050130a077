use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use tracing::{debug, warn};
use validator::Validate;

use crate::error::{ApiError, FieldError};

/// JSON body that has passed its `validator` rules.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        if let Err(errs) = value.validate() {
            warn!(errors = %errs, "request body failed validation");
            return Err(errs.into());
        }
        Ok(ValidJson(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    warn!(reason = %rejection.body_text(), "rejected json body");
    let code = match &rejection {
        JsonRejection::MissingJsonContentType(_) => "content_type",
        JsonRejection::JsonSyntaxError(_) => "syntax",
        _ => "invalid",
    };
    ApiError::Validation(vec![FieldError::new("body", code, rejection.body_text())])
}

/// Single numeric path segment. `None` when the segment is not an `i32`, so
/// handlers decide whether that reads as "no such record" or a no-op.
#[derive(Debug)]
pub struct IdPath(pub Option<i32>);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection)?;
        let id = raw.trim().parse::<i32>().ok();
        if id.is_none() {
            debug!(segment = %raw, "path segment is not an id");
        }
        Ok(IdPath(id))
    }
}

fn path_rejection(rejection: PathRejection) -> ApiError {
    warn!(reason = %rejection.body_text(), "rejected path");
    ApiError::bad_request(rejection.body_text())
}

/// Treats `""` like an absent optional string.
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
