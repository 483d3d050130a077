use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveJobRequest {
    #[validate(range(min = 1, message = "jobId must be a positive id"))]
    pub job_id: i32,
}
