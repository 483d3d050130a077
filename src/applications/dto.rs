use serde::Deserialize;
use validator::Validate;

use crate::schema::ApplicationStatus;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    #[validate(range(min = 1, message = "jobId must be a positive id"))]
    pub job_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}
