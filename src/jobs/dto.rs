use serde::{Deserialize, Deserializer};
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use validator::Validate;

use crate::extract::empty_as_none;
use crate::schema::{ContactChannel, JobFilters, JobStatus, JobType, NewJob};

/// Body of `POST /jobs`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[validate(length(min = 1, message = "Sector is required"))]
    pub sector: String,
    #[serde(default, deserialize_with = "date_or_datetime")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[validate(length(min = 1, message = "Contact name is required"))]
    pub contact_name: String,
    #[validate(length(min = 1, message = "Contact phone is required"))]
    pub contact_phone: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_preferences: Vec<ContactChannel>,
}

impl From<CreateJobRequest> for NewJob {
    fn from(r: CreateJobRequest) -> Self {
        NewJob {
            title: r.title.trim().to_string(),
            description: r.description,
            location: r.location.trim().to_string(),
            job_type: r.job_type,
            sector: r.sector.trim().to_string(),
            start_date: r.start_date,
            duration: r.duration,
            status: r.status,
            contact_name: r.contact_name,
            contact_phone: r.contact_phone,
            contact_email: r.contact_email,
            contact_preferences: r.contact_preferences,
        }
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
fn date_or_datetime<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(Some(ts));
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(|d| Some(d.midnight().assume_utc()))
        .map_err(|_| serde::de::Error::custom(format!("invalid startDate `{raw}`")))
}

/// Query string of `GET /jobs`; blank values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    pub sector: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

impl JobQuery {
    /// `None` when `type` or `status` names no known value, which matches no job.
    pub fn into_filters(self) -> Option<JobFilters> {
        fn present(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }

        let job_type = match present(self.job_type) {
            Some(t) => Some(t.parse::<JobType>().ok()?),
            None => None,
        };
        let status = match present(self.status) {
            Some(s) => Some(s.parse::<JobStatus>().ok()?),
            None => None,
        };
        Some(JobFilters {
            sector: present(self.sector),
            job_type,
            location: present(self.location),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn start_date_accepts_plain_dates() {
        #[derive(Deserialize)]
        struct W {
            #[serde(default, deserialize_with = "date_or_datetime")]
            d: Option<OffsetDateTime>,
        }
        let w: W = serde_json::from_str(r#"{"d":"2024-03-15"}"#).unwrap();
        assert_eq!(w.d, Some(datetime!(2024-03-15 0:00 UTC)));
        let w: W = serde_json::from_str(r#"{"d":"2024-03-15T08:30:00Z"}"#).unwrap();
        assert_eq!(w.d, Some(datetime!(2024-03-15 8:30 UTC)));
        let w: W = serde_json::from_str(r#"{"d":""}"#).unwrap();
        assert_eq!(w.d, None);
        assert!(serde_json::from_str::<W>(r#"{"d":"demain"}"#).is_err());
    }

    #[test]
    fn query_ignores_blanks_and_flags_unknown_values() {
        let q = JobQuery {
            sector: Some("".into()),
            job_type: Some("part_time".into()),
            ..Default::default()
        };
        let f = q.into_filters().unwrap();
        assert!(f.sector.is_none());
        assert_eq!(f.job_type, Some(JobType::PartTime));

        let q = JobQuery {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(q.into_filters().is_none());
    }
}
