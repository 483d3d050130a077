use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;
use crate::extract::empty_as_none;
use crate::schema::{ContactChannel, EmployerProfileChanges, JobSeekerProfileChanges};

/// Body of `POST /job-seeker/profile`. Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerProfileRequest {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location: Option<String>,
    #[validate(range(min = 14, max = 100, message = "Age must be between 14 and 100"))]
    pub age: Option<i32>,
    pub skills: Option<Vec<String>>,
    pub desired_sectors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub audio_presentation_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub profile_photo_url: Option<String>,
    pub experience: Option<serde_json::Value>,
}

impl JobSeekerProfileRequest {
    /// List entries must be non-blank; they are stored trimmed.
    pub fn into_changes(self) -> Result<JobSeekerProfileChanges, ApiError> {
        Ok(JobSeekerProfileChanges {
            location: self.location,
            age: self.age,
            skills: self.skills.map(|v| clean_entries("skills", v)).transpose()?,
            desired_sectors: self
                .desired_sectors
                .map(|v| clean_entries("desiredSectors", v))
                .transpose()?,
            audio_presentation_url: self.audio_presentation_url,
            profile_photo_url: self.profile_photo_url,
            experience: self.experience.filter(|v| !v.is_null()),
        })
    }
}

fn clean_entries(field: &str, entries: Vec<String>) -> Result<Vec<String>, ApiError> {
    entries
        .into_iter()
        .map(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                Err(ApiError::invalid(field, "length", format!("{field} entries must not be empty")))
            } else {
                Ok(s)
            }
        })
        .collect()
}

/// Body of `POST /employer/profile`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfileRequest {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub company_size: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sector: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    pub contact_preferences: Option<Vec<ContactChannel>>,
}

impl From<EmployerProfileRequest> for EmployerProfileChanges {
    fn from(r: EmployerProfileRequest) -> Self {
        EmployerProfileChanges {
            company_name: r.company_name,
            company_size: r.company_size,
            sector: r.sector,
            location: r.location,
            description: r.description,
            contact_preferences: r.contact_preferences.map(|v| {
                let mut unique = Vec::with_capacity(v.len());
                for c in v {
                    if !unique.contains(&c) {
                        unique.push(c);
                    }
                }
                unique
            }),
        }
    }
}
