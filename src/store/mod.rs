//! Storage layer: the single owner of every job board record.
//!
//! Handlers only see [`JobStore`]; which backend sits behind it is decided at
//! start-up from the configuration.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::schema::{
    Application, ApplicationStatus, ApplicationWithJob, ApplicationWithJobAndSeeker,
    EmployerProfile, EmployerProfileChanges, Job, JobFilters, JobSeekerProfile,
    JobSeekerProfileChanges, JobWithEmployer, NewApplication, NewJob, NewSavedJob, NewUser,
    SavedJob, SavedJobWithJob, User, UserWithProfile,
};

mod memory;
mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username `{0}` is already taken")]
    DuplicateUsername(String),

    #[error("job seeker {job_seeker_id} already applied to job {job_id}")]
    DuplicateApplication { job_id: i32, job_seeker_id: i32 },

    #[error("user {0} not found")]
    UserNotFound(i32),

    #[error("job {0} not found")]
    JobNotFound(i32),

    #[error("application {0} not found")]
    ApplicationNotFound(i32),

    #[error("application cannot move from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Behaviour switches shared by every backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Accept a second application for the same (job, job seeker) pair.
    pub allow_duplicate_applications: bool,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    // users
    async fn get_user(&self, id: i32) -> StoreResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn get_user_with_profile(&self, id: i32) -> StoreResult<Option<UserWithProfile>>;

    // profiles, upserted by user id
    async fn create_or_update_job_seeker_profile(
        &self,
        user_id: i32,
        changes: JobSeekerProfileChanges,
    ) -> StoreResult<JobSeekerProfile>;
    async fn create_or_update_employer_profile(
        &self,
        user_id: i32,
        changes: EmployerProfileChanges,
    ) -> StoreResult<EmployerProfile>;

    // jobs
    async fn create_job(&self, employer_id: i32, job: NewJob) -> StoreResult<Job>;
    async fn get_jobs(&self, filters: &JobFilters) -> StoreResult<Vec<JobWithEmployer>>;
    async fn get_job_by_id(&self, id: i32) -> StoreResult<Option<JobWithEmployer>>;
    async fn get_jobs_by_employer_id(&self, employer_id: i32) -> StoreResult<Vec<Job>>;
    /// Missing jobs are ignored.
    async fn increment_job_views(&self, job_id: i32) -> StoreResult<()>;

    // applications
    async fn create_application(&self, application: NewApplication) -> StoreResult<Application>;
    async fn get_application(&self, id: i32) -> StoreResult<Option<ApplicationWithJob>>;
    async fn get_applications_by_job_seeker_id(
        &self,
        job_seeker_id: i32,
    ) -> StoreResult<Vec<ApplicationWithJob>>;
    async fn get_applications_by_employer_id(
        &self,
        employer_id: i32,
    ) -> StoreResult<Vec<ApplicationWithJobAndSeeker>>;
    async fn update_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> StoreResult<Application>;

    // saved jobs
    /// Returns the existing bookmark when the pair is already saved.
    async fn save_job(&self, saved_job: NewSavedJob) -> StoreResult<SavedJob>;
    /// Missing bookmarks are ignored.
    async fn remove_saved_job(&self, job_id: i32, job_seeker_id: i32) -> StoreResult<()>;
    async fn get_saved_jobs_by_job_seeker_id(
        &self,
        job_seeker_id: i32,
    ) -> StoreResult<Vec<SavedJobWithJob>>;
}

/// Newest first; equal timestamps fall back to the higher id.
pub(crate) fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (OffsetDateTime, i32)) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}
