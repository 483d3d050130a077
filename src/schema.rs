//! Entities, insert shapes and joined read models of the job board.
//!
//! Every record is keyed by an `i32` id handed out by the store. JSON uses
//! camelCase field names and RFC 3339 timestamps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Raised when a text column or query value names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    /// Fixed at registration; decides which endpoints a user may call.
    Role { JobSeeker => "job_seeker", Employer => "employer" }
}

text_enum! {
    Language { Fr => "fr", En => "en" }
}

text_enum! {
    JobType {
        FullTime => "full_time",
        PartTime => "part_time",
        Temporary => "temporary",
        Service => "service",
    }
}

text_enum! {
    JobStatus {
        Active => "active",
        Closed => "closed",
        Draft => "draft",
        Expired => "expired",
    }
}

text_enum! {
    ApplicationStatus {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

text_enum! {
    /// Channel through which an employer accepts to be contacted.
    ContactChannel {
        Phone => "phone",
        Whatsapp => "whatsapp",
        Email => "email",
        Sms => "sms",
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Fr
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Active
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Pending
    }
}

impl ApplicationStatus {
    /// Only pending applications can be decided, and only once.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Pending, ApplicationStatus::Accepted)
                | (ApplicationStatus::Pending, ApplicationStatus::Rejected)
        )
    }
}

// ---- stored records ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String, // argon2, never sent to clients
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: Role,
    pub preferred_language: Language,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerProfile {
    pub id: i32,
    pub user_id: i32,
    pub location: Option<String>,
    pub age: Option<i32>,
    pub skills: Vec<String>,
    pub desired_sectors: Vec<String>,
    pub audio_presentation_url: Option<String>,
    pub profile_photo_url: Option<String>,
    pub completion_percentage: i32,
    pub experience: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfile {
    pub id: i32,
    pub user_id: i32,
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub sector: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub contact_preferences: Vec<ContactChannel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub employer_id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub sector: String,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub start_date: Option<OffsetDateTime>,
    pub duration: Option<String>,
    pub status: JobStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub contact_preferences: Vec<ContactChannel>,
    pub views: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: i32,
    pub job_id: i32,
    pub job_seeker_id: i32,
    pub status: ApplicationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJob {
    pub id: i32,
    pub job_id: i32,
    pub job_seeker_id: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// ---- insert shapes ----

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: Role,
    pub preferred_language: Language,
}

/// Fields to merge into a job seeker profile. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct JobSeekerProfileChanges {
    pub location: Option<String>,
    pub age: Option<i32>,
    pub skills: Option<Vec<String>>,
    pub desired_sectors: Option<Vec<String>>,
    pub audio_presentation_url: Option<String>,
    pub profile_photo_url: Option<String>,
    pub experience: Option<serde_json::Value>,
}

impl JobSeekerProfileChanges {
    pub fn apply_to(self, profile: &mut JobSeekerProfile) {
        if let Some(v) = self.location {
            profile.location = Some(v);
        }
        if let Some(v) = self.age {
            profile.age = Some(v);
        }
        if let Some(v) = self.skills {
            profile.skills = v;
        }
        if let Some(v) = self.desired_sectors {
            profile.desired_sectors = v;
        }
        if let Some(v) = self.audio_presentation_url {
            profile.audio_presentation_url = Some(v);
        }
        if let Some(v) = self.profile_photo_url {
            profile.profile_photo_url = Some(v);
        }
        if let Some(v) = self.experience {
            profile.experience = Some(v);
        }
    }
}

/// Fields to merge into an employer profile. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct EmployerProfileChanges {
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub sector: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub contact_preferences: Option<Vec<ContactChannel>>,
}

impl EmployerProfileChanges {
    pub fn apply_to(self, profile: &mut EmployerProfile) {
        if let Some(v) = self.company_name {
            profile.company_name = Some(v);
        }
        if let Some(v) = self.company_size {
            profile.company_size = Some(v);
        }
        if let Some(v) = self.sector {
            profile.sector = Some(v);
        }
        if let Some(v) = self.location {
            profile.location = Some(v);
        }
        if let Some(v) = self.description {
            profile.description = Some(v);
        }
        if let Some(v) = self.contact_preferences {
            profile.contact_preferences = v;
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: JobType,
    pub sector: String,
    pub start_date: Option<OffsetDateTime>,
    pub duration: Option<String>,
    pub status: JobStatus,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub contact_preferences: Vec<ContactChannel>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewApplication {
    pub job_id: i32,
    pub job_seeker_id: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct NewSavedJob {
    pub job_id: i32,
    pub job_seeker_id: i32,
}

/// Narrowing applied by the public job listing. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub sector: Option<String>,
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub status: Option<JobStatus>,
}

impl JobFilters {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(sector) = &self.sector {
            if &job.sector != sector {
                return false;
            }
        }
        if let Some(job_type) = self.job_type {
            if job.job_type != job_type {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !job
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        if let Some(status) = self.status {
            if job.status != status {
                return false;
            }
        }
        true
    }
}

// ---- read models ----

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub job_seeker_profile: Option<JobSeekerProfile>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub employer_profile: Option<EmployerProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub employer_profile: Option<EmployerProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobWithEmployer {
    #[serde(flatten)]
    pub job: Job,
    pub employer: EmployerWithProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: Application,
    pub job: Job,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithJobAndSeeker {
    #[serde(flatten)]
    pub application: Application,
    pub job: Job,
    pub job_seeker: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedJobWithJob {
    #[serde(flatten)]
    pub saved_job: SavedJob,
    pub job: Job,
}

/// Share of the nine profile checks that pass, as a rounded percentage.
pub fn completion_percentage(user: &User, profile: &JobSeekerProfile) -> i32 {
    fn filled(s: &Option<String>) -> bool {
        s.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    let checks = [
        !user.first_name.trim().is_empty(),
        !user.last_name.trim().is_empty(),
        !user.phone.trim().is_empty(),
        filled(&profile.location),
        !profile.skills.is_empty(),
        !profile.desired_sectors.is_empty(),
        filled(&profile.audio_presentation_url),
        filled(&profile.profile_photo_url),
        profile
            .experience
            .as_ref()
            .is_some_and(|v| !v.is_null() && v != &serde_json::Value::String(String::new())),
    ];
    let done = checks.iter().filter(|c| **c).count() as f64;
    (done / checks.len() as f64 * 100.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn user() -> User {
        User {
            id: 1,
            username: "fatou".into(),
            password_hash: "hash".into(),
            first_name: "Fatou".into(),
            last_name: "Sow".into(),
            phone: "+221788888888".into(),
            email: None,
            role: Role::JobSeeker,
            preferred_language: Language::Fr,
            created_at: datetime!(2024-01-01 10:00 UTC),
        }
    }

    fn empty_profile() -> JobSeekerProfile {
        JobSeekerProfile {
            id: 1,
            user_id: 1,
            location: None,
            age: None,
            skills: vec![],
            desired_sectors: vec![],
            audio_presentation_url: None,
            profile_photo_url: None,
            completion_percentage: 0,
            experience: None,
        }
    }

    fn job(sector: &str, location: &str) -> Job {
        Job {
            id: 1,
            employer_id: 1,
            title: "Agent".into(),
            description: "desc".into(),
            location: location.into(),
            job_type: JobType::FullTime,
            sector: sector.into(),
            start_date: None,
            duration: None,
            status: JobStatus::Active,
            created_at: datetime!(2024-01-01 10:00 UTC),
            contact_name: "Moussa".into(),
            contact_phone: "+221777777777".into(),
            contact_email: None,
            contact_preferences: vec![ContactChannel::Phone],
            views: 0,
        }
    }

    #[test]
    fn enums_round_trip_through_text() {
        assert_eq!("job_seeker".parse::<Role>().unwrap(), Role::JobSeeker);
        assert_eq!(JobType::PartTime.as_str(), "part_time");
        assert_eq!(
            serde_json::to_string(&ContactChannel::Whatsapp).unwrap(),
            "\"whatsapp\""
        );
        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(err.value, "admin");
    }

    #[test]
    fn only_pending_applications_can_be_decided() {
        use ApplicationStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn completion_counts_user_and_profile_fields() {
        let user = user();
        let mut profile = empty_profile();
        // names and phone only: 3 of 9
        assert_eq!(completion_percentage(&user, &profile), 33);

        profile.location = Some("Dakar".into());
        profile.skills = vec!["cooking".into()];
        profile.desired_sectors = vec!["services".into()];
        profile.audio_presentation_url = Some("/api/media/a.webm".into());
        profile.profile_photo_url = Some("/api/media/p.png".into());
        profile.experience = Some(serde_json::json!("2 ans"));
        assert_eq!(completion_percentage(&user, &profile), 100);
    }

    #[test]
    fn changes_keep_unspecified_fields() {
        let mut profile = empty_profile();
        profile.location = Some("Dakar".into());
        JobSeekerProfileChanges {
            age: Some(25),
            ..Default::default()
        }
        .apply_to(&mut profile);
        assert_eq!(profile.location.as_deref(), Some("Dakar"));
        assert_eq!(profile.age, Some(25));
    }

    #[test]
    fn filters_match_sector_exactly_and_location_loosely() {
        let tech = job("technology", "Dakar, Plateau");
        let retail = job("retail", "Thiès");

        let by_sector = JobFilters {
            sector: Some("technology".into()),
            ..Default::default()
        };
        assert!(by_sector.matches(&tech));
        assert!(!by_sector.matches(&retail));

        let by_location = JobFilters {
            location: Some("dakar".into()),
            ..Default::default()
        };
        assert!(by_location.matches(&tech));
        assert!(!by_location.matches(&retail));
    }

    #[test]
    fn job_json_uses_client_field_names() {
        let json = serde_json::to_value(job("retail", "Dakar")).unwrap();
        assert_eq!(json["type"], "full_time");
        assert_eq!(json["contactPhone"], "+221777777777");
        assert!(json.get("jobType").is_none());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "job_seeker");
    }
}
