use std::collections::HashMap;
use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;
use tracing::{debug, info};

use super::{JobStore, StoreError, StoreOptions, StoreResult};
use crate::schema::{
    completion_percentage, Application, ApplicationStatus, ApplicationWithJob,
    ApplicationWithJobAndSeeker, ContactChannel, EmployerProfile, EmployerProfileChanges,
    EmployerWithProfile, Job, JobFilters, JobSeekerProfile, JobSeekerProfileChanges,
    JobWithEmployer, NewApplication, NewJob, NewSavedJob, NewUser, Role, SavedJob,
    SavedJobWithJob, UnknownVariant, User, UserWithProfile,
};

macro_rules! user_columns {
    () => {
        "id, username, password AS password_hash, first_name, last_name, phone, email, role, \
         preferred_language, created_at"
    };
}

macro_rules! job_seeker_profile_columns {
    () => {
        "id, user_id, location, age, skills, desired_sectors, audio_presentation_url, \
         profile_photo_url, completion_percentage, experience"
    };
}

macro_rules! employer_profile_columns {
    () => {
        "id, user_id, company_name, company_size, sector, location, description, \
         contact_preferences"
    };
}

macro_rules! job_columns {
    () => {
        "id, employer_id, title, description, location, \"type\" AS job_type, sector, start_date, \
         duration, status, created_at, contact_name, contact_phone, contact_email, \
         contact_preferences, views"
    };
}

macro_rules! application_columns {
    () => {
        "id, job_id, job_seeker_id, status, created_at"
    };
}

macro_rules! saved_job_columns {
    () => {
        "id, job_id, job_seeker_id, created_at"
    };
}

/// Durable store backed by the tables in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    options: StoreOptions,
}

impl PgStore {
    pub async fn connect(database_url: &str, options: StoreOptions) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool, options })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        info!("database migrations applied");
        Ok(())
    }

    async fn users_by_id(&self, ids: &[i32]) -> StoreResult<HashMap<i32, User>> {
        let rows = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .context("load users")?;
        rows.into_iter()
            .map(|r| User::try_from(r).map(|u| (u.id, u)))
            .collect()
    }

    async fn jobs_by_id(&self, ids: &[i32]) -> StoreResult<HashMap<i32, Job>> {
        let rows = sqlx::query_as::<_, JobRow>(concat!(
            "SELECT ",
            job_columns!(),
            " FROM jobs WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .context("load jobs")?;
        rows.into_iter()
            .map(|r| Job::try_from(r).map(|j| (j.id, j)))
            .collect()
    }

    async fn employer_profiles_by_user(
        &self,
        user_ids: &[i32],
    ) -> StoreResult<HashMap<i32, EmployerProfile>> {
        let rows = sqlx::query_as::<_, EmployerProfileRow>(concat!(
            "SELECT ",
            employer_profile_columns!(),
            " FROM employer_profiles WHERE user_id = ANY($1)"
        ))
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .context("load employer profiles")?;
        rows.into_iter()
            .map(|r| EmployerProfile::try_from(r).map(|p| (p.user_id, p)))
            .collect()
    }

    async fn attach_employers(&self, jobs: Vec<Job>) -> StoreResult<Vec<JobWithEmployer>> {
        let mut employer_ids: Vec<i32> = jobs.iter().map(|j| j.employer_id).collect();
        employer_ids.sort_unstable();
        employer_ids.dedup();

        let users = self.users_by_id(&employer_ids).await?;
        let profiles = self.employer_profiles_by_user(&employer_ids).await?;

        Ok(jobs
            .into_iter()
            .filter_map(|job| {
                let user = users.get(&job.employer_id)?.clone();
                Some(JobWithEmployer {
                    employer: EmployerWithProfile {
                        employer_profile: profiles.get(&user.id).cloned(),
                        user,
                    },
                    job,
                })
            })
            .collect())
    }

    async fn find_job_seeker_profile(&self, user_id: i32) -> StoreResult<Option<JobSeekerProfile>> {
        let row = sqlx::query_as::<_, JobSeekerProfileRow>(concat!(
            "SELECT ",
            job_seeker_profile_columns!(),
            " FROM job_seeker_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("load job seeker profile")?;
        Ok(row.map(JobSeekerProfile::from))
    }

    async fn find_employer_profile(&self, user_id: i32) -> StoreResult<Option<EmployerProfile>> {
        let row = sqlx::query_as::<_, EmployerProfileRow>(concat!(
            "SELECT ",
            employer_profile_columns!(),
            " FROM employer_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("load employer profile")?;
        row.map(EmployerProfile::try_from).transpose()
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn get_user(&self, id: i32) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("get user")?;
        row.map(User::try_from).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("get user by username")?;
        row.map(User::try_from).transpose()
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "INSERT INTO users (username, password, first_name, last_name, phone, email, role, \
             preferred_language) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            user_columns!()
        ))
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(new.role.as_str())
        .bind(new.preferred_language.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateUsername(new.username.clone())
            }
            other => StoreError::Backend(anyhow::Error::new(other).context("insert user")),
        })?;
        debug!(user_id = row.id, "user stored");
        User::try_from(row)
    }

    async fn get_user_with_profile(&self, id: i32) -> StoreResult<Option<UserWithProfile>> {
        let Some(user) = self.get_user(id).await? else {
            return Ok(None);
        };
        let (job_seeker_profile, employer_profile) = match user.role {
            Role::JobSeeker => (self.find_job_seeker_profile(id).await?, None),
            Role::Employer => (None, self.find_employer_profile(id).await?),
        };
        Ok(Some(UserWithProfile {
            user,
            job_seeker_profile,
            employer_profile,
        }))
    }

    async fn create_or_update_job_seeker_profile(
        &self,
        user_id: i32,
        changes: JobSeekerProfileChanges,
    ) -> StoreResult<JobSeekerProfile> {
        let mut tx = self.pool.begin().await.context("begin tx")?;

        // Row lock on the user serialises concurrent upserts for the same profile.
        let user = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock user")?
        .ok_or(StoreError::UserNotFound(user_id))
        .and_then(User::try_from)?;

        let existing = sqlx::query_as::<_, JobSeekerProfileRow>(concat!(
            "SELECT ",
            job_seeker_profile_columns!(),
            " FROM job_seeker_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("load job seeker profile")?;

        let mut profile = existing.map(JobSeekerProfile::from).unwrap_or(JobSeekerProfile {
            id: 0,
            user_id,
            location: None,
            age: None,
            skills: Vec::new(),
            desired_sectors: Vec::new(),
            audio_presentation_url: None,
            profile_photo_url: None,
            completion_percentage: 0,
            experience: None,
        });
        changes.apply_to(&mut profile);
        profile.completion_percentage = completion_percentage(&user, &profile);

        let row = sqlx::query_as::<_, JobSeekerProfileRow>(concat!(
            "INSERT INTO job_seeker_profiles (user_id, location, age, skills, desired_sectors, \
             audio_presentation_url, profile_photo_url, completion_percentage, experience) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (user_id) DO UPDATE SET location = EXCLUDED.location, \
             age = EXCLUDED.age, skills = EXCLUDED.skills, \
             desired_sectors = EXCLUDED.desired_sectors, \
             audio_presentation_url = EXCLUDED.audio_presentation_url, \
             profile_photo_url = EXCLUDED.profile_photo_url, \
             completion_percentage = EXCLUDED.completion_percentage, \
             experience = EXCLUDED.experience RETURNING ",
            job_seeker_profile_columns!()
        ))
        .bind(user_id)
        .bind(&profile.location)
        .bind(profile.age)
        .bind(&profile.skills)
        .bind(&profile.desired_sectors)
        .bind(&profile.audio_presentation_url)
        .bind(&profile.profile_photo_url)
        .bind(profile.completion_percentage)
        .bind(&profile.experience)
        .fetch_one(&mut *tx)
        .await
        .context("upsert job seeker profile")?;

        tx.commit().await.context("commit tx")?;
        Ok(row.into())
    }

    async fn create_or_update_employer_profile(
        &self,
        user_id: i32,
        changes: EmployerProfileChanges,
    ) -> StoreResult<EmployerProfile> {
        let mut tx = self.pool.begin().await.context("begin tx")?;

        let locked: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .context("lock user")?;
        if locked.is_none() {
            return Err(StoreError::UserNotFound(user_id));
        }

        let existing = sqlx::query_as::<_, EmployerProfileRow>(concat!(
            "SELECT ",
            employer_profile_columns!(),
            " FROM employer_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("load employer profile")?;

        let mut profile = match existing {
            Some(row) => EmployerProfile::try_from(row)?,
            None => EmployerProfile {
                id: 0,
                user_id,
                company_name: None,
                company_size: None,
                sector: None,
                location: None,
                description: None,
                contact_preferences: Vec::new(),
            },
        };
        changes.apply_to(&mut profile);

        let row = sqlx::query_as::<_, EmployerProfileRow>(concat!(
            "INSERT INTO employer_profiles (user_id, company_name, company_size, sector, location, \
             description, contact_preferences) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (user_id) DO UPDATE SET company_name = EXCLUDED.company_name, \
             company_size = EXCLUDED.company_size, sector = EXCLUDED.sector, \
             location = EXCLUDED.location, description = EXCLUDED.description, \
             contact_preferences = EXCLUDED.contact_preferences RETURNING ",
            employer_profile_columns!()
        ))
        .bind(user_id)
        .bind(&profile.company_name)
        .bind(&profile.company_size)
        .bind(&profile.sector)
        .bind(&profile.location)
        .bind(&profile.description)
        .bind(channel_texts(&profile.contact_preferences))
        .fetch_one(&mut *tx)
        .await
        .context("upsert employer profile")?;

        tx.commit().await.context("commit tx")?;
        EmployerProfile::try_from(row)
    }

    async fn create_job(&self, employer_id: i32, new: NewJob) -> StoreResult<Job> {
        let row = sqlx::query_as::<_, JobRow>(concat!(
            "INSERT INTO jobs (employer_id, title, description, location, \"type\", sector, \
             start_date, duration, status, contact_name, contact_phone, contact_email, \
             contact_preferences) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING ",
            job_columns!()
        ))
        .bind(employer_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.location)
        .bind(new.job_type.as_str())
        .bind(&new.sector)
        .bind(new.start_date)
        .bind(&new.duration)
        .bind(new.status.as_str())
        .bind(&new.contact_name)
        .bind(&new.contact_phone)
        .bind(&new.contact_email)
        .bind(channel_texts(&new.contact_preferences))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::UserNotFound(employer_id)
            }
            other => StoreError::Backend(anyhow::Error::new(other).context("insert job")),
        })?;
        Job::try_from(row)
    }

    async fn get_jobs(&self, filters: &JobFilters) -> StoreResult<Vec<JobWithEmployer>> {
        let rows = sqlx::query_as::<_, JobRow>(concat!(
            "SELECT ",
            job_columns!(),
            " FROM jobs \
             WHERE ($1::text IS NULL OR sector = $1) \
               AND ($2::text IS NULL OR \"type\" = $2) \
               AND ($3::text IS NULL OR strpos(lower(location), lower($3)) > 0) \
               AND ($4::text IS NULL OR status = $4) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(filters.sector.as_deref())
        .bind(filters.job_type.map(|t| t.as_str()))
        .bind(filters.location.as_deref())
        .bind(filters.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .context("list jobs")?;
        let jobs = rows
            .into_iter()
            .map(Job::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        self.attach_employers(jobs).await
    }

    async fn get_job_by_id(&self, id: i32) -> StoreResult<Option<JobWithEmployer>> {
        let row = sqlx::query_as::<_, JobRow>(concat!(
            "SELECT ",
            job_columns!(),
            " FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("get job")?;
        let Some(job) = row.map(Job::try_from).transpose()? else {
            return Ok(None);
        };
        Ok(self.attach_employers(vec![job]).await?.pop())
    }

    async fn get_jobs_by_employer_id(&self, employer_id: i32) -> StoreResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(concat!(
            "SELECT ",
            job_columns!(),
            " FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await
        .context("list employer jobs")?;
        rows.into_iter().map(Job::try_from).collect()
    }

    async fn increment_job_views(&self, job_id: i32) -> StoreResult<()> {
        sqlx::query("UPDATE jobs SET views = views + 1 WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await
            .context("increment job views")?;
        Ok(())
    }

    async fn create_application(&self, new: NewApplication) -> StoreResult<Application> {
        let mut tx = self.pool.begin().await.context("begin tx")?;

        // Locking the job row serialises applications to the same job.
        let job: Option<i32> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1 FOR UPDATE")
            .bind(new.job_id)
            .fetch_optional(&mut *tx)
            .await
            .context("lock job")?;
        if job.is_none() {
            return Err(StoreError::JobNotFound(new.job_id));
        }

        if !self.options.allow_duplicate_applications {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM applications WHERE job_id = $1 AND job_seeker_id = $2)",
            )
            .bind(new.job_id)
            .bind(new.job_seeker_id)
            .fetch_one(&mut *tx)
            .await
            .context("check existing application")?;
            if exists {
                return Err(StoreError::DuplicateApplication {
                    job_id: new.job_id,
                    job_seeker_id: new.job_seeker_id,
                });
            }
        }

        let row = sqlx::query_as::<_, ApplicationRow>(concat!(
            "INSERT INTO applications (job_id, job_seeker_id, status) VALUES ($1, $2, $3) \
             RETURNING ",
            application_columns!()
        ))
        .bind(new.job_id)
        .bind(new.job_seeker_id)
        .bind(ApplicationStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await
        .context("insert application")?;

        tx.commit().await.context("commit tx")?;
        Application::try_from(row)
    }

    async fn get_application(&self, id: i32) -> StoreResult<Option<ApplicationWithJob>> {
        let row = sqlx::query_as::<_, ApplicationRow>(concat!(
            "SELECT ",
            application_columns!(),
            " FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("get application")?;
        let Some(application) = row.map(Application::try_from).transpose()? else {
            return Ok(None);
        };
        let mut jobs = self.jobs_by_id(&[application.job_id]).await?;
        Ok(jobs
            .remove(&application.job_id)
            .map(|job| ApplicationWithJob { application, job }))
    }

    async fn get_applications_by_job_seeker_id(
        &self,
        job_seeker_id: i32,
    ) -> StoreResult<Vec<ApplicationWithJob>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(concat!(
            "SELECT ",
            application_columns!(),
            " FROM applications WHERE job_seeker_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(job_seeker_id)
        .fetch_all(&self.pool)
        .await
        .context("list job seeker applications")?;
        let applications = rows
            .into_iter()
            .map(Application::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        let job_ids: Vec<i32> = applications.iter().map(|a| a.job_id).collect();
        let jobs = self.jobs_by_id(&job_ids).await?;
        Ok(applications
            .into_iter()
            .filter_map(|application| {
                let job = jobs.get(&application.job_id)?.clone();
                Some(ApplicationWithJob { application, job })
            })
            .collect())
    }

    async fn get_applications_by_employer_id(
        &self,
        employer_id: i32,
    ) -> StoreResult<Vec<ApplicationWithJobAndSeeker>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT a.id, a.job_id, a.job_seeker_id, a.status, a.created_at
              FROM applications a
              JOIN jobs j ON j.id = a.job_id
             WHERE j.employer_id = $1
             ORDER BY a.created_at DESC, a.id DESC
            "#,
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await
        .context("list employer applications")?;
        let applications = rows
            .into_iter()
            .map(Application::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        let job_ids: Vec<i32> = applications.iter().map(|a| a.job_id).collect();
        let seeker_ids: Vec<i32> = applications.iter().map(|a| a.job_seeker_id).collect();
        let jobs = self.jobs_by_id(&job_ids).await?;
        let seekers = self.users_by_id(&seeker_ids).await?;
        Ok(applications
            .into_iter()
            .filter_map(|application| {
                let job = jobs.get(&application.job_id)?.clone();
                let job_seeker = seekers.get(&application.job_seeker_id)?.clone();
                Some(ApplicationWithJobAndSeeker {
                    application,
                    job,
                    job_seeker,
                })
            })
            .collect())
    }

    async fn update_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> StoreResult<Application> {
        let mut tx = self.pool.begin().await.context("begin tx")?;
        let current = sqlx::query_as::<_, ApplicationRow>(concat!(
            "SELECT ",
            application_columns!(),
            " FROM applications WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock application")?
        .ok_or(StoreError::ApplicationNotFound(id))
        .and_then(Application::try_from)?;

        if !current.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let row = sqlx::query_as::<_, ApplicationRow>(concat!(
            "UPDATE applications SET status = $2 WHERE id = $1 RETURNING ",
            application_columns!()
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await
        .context("update application status")?;
        tx.commit().await.context("commit tx")?;
        Application::try_from(row)
    }

    async fn save_job(&self, new: NewSavedJob) -> StoreResult<SavedJob> {
        let inserted = sqlx::query_as::<_, SavedJobRow>(concat!(
            "INSERT INTO saved_jobs (job_id, job_seeker_id) VALUES ($1, $2) \
             ON CONFLICT (job_id, job_seeker_id) DO NOTHING RETURNING ",
            saved_job_columns!()
        ))
        .bind(new.job_id)
        .bind(new.job_seeker_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::JobNotFound(new.job_id)
            }
            other => StoreError::Backend(anyhow::Error::new(other).context("insert saved job")),
        })?;
        if let Some(row) = inserted {
            return Ok(row.into());
        }

        let existing = sqlx::query_as::<_, SavedJobRow>(concat!(
            "SELECT ",
            saved_job_columns!(),
            " FROM saved_jobs WHERE job_id = $1 AND job_seeker_id = $2"
        ))
        .bind(new.job_id)
        .bind(new.job_seeker_id)
        .fetch_one(&self.pool)
        .await
        .context("load existing saved job")?;
        Ok(existing.into())
    }

    async fn remove_saved_job(&self, job_id: i32, job_seeker_id: i32) -> StoreResult<()> {
        sqlx::query("DELETE FROM saved_jobs WHERE job_id = $1 AND job_seeker_id = $2")
            .bind(job_id)
            .bind(job_seeker_id)
            .execute(&self.pool)
            .await
            .context("delete saved job")?;
        Ok(())
    }

    async fn get_saved_jobs_by_job_seeker_id(
        &self,
        job_seeker_id: i32,
    ) -> StoreResult<Vec<SavedJobWithJob>> {
        let rows = sqlx::query_as::<_, SavedJobRow>(concat!(
            "SELECT ",
            saved_job_columns!(),
            " FROM saved_jobs WHERE job_seeker_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(job_seeker_id)
        .fetch_all(&self.pool)
        .await
        .context("list saved jobs")?;
        let saved: Vec<SavedJob> = rows.into_iter().map(SavedJob::from).collect();

        let job_ids: Vec<i32> = saved.iter().map(|s| s.job_id).collect();
        let jobs = self.jobs_by_id(&job_ids).await?;
        Ok(saved
            .into_iter()
            .filter_map(|saved_job| {
                let job = jobs.get(&saved_job.job_id)?.clone();
                Some(SavedJobWithJob { saved_job, job })
            })
            .collect())
    }
}

// ---- rows ----

fn parse<T: FromStr<Err = UnknownVariant>>(value: &str) -> StoreResult<T> {
    value
        .parse()
        .map_err(|e: UnknownVariant| StoreError::Backend(e.into()))
}

fn parse_channels(values: &[String]) -> StoreResult<Vec<ContactChannel>> {
    values.iter().map(|v| parse(v)).collect()
}

fn channel_texts(channels: &[ContactChannel]) -> Vec<String> {
    channels.iter().map(|c| c.as_str().to_string()).collect()
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i32,
    username: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    phone: String,
    email: Option<String>,
    role: String,
    preferred_language: String,
    created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(r: UserRow) -> StoreResult<Self> {
        Ok(User {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
            email: r.email,
            role: parse(&r.role)?,
            preferred_language: parse(&r.preferred_language)?,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct JobSeekerProfileRow {
    id: i32,
    user_id: i32,
    location: Option<String>,
    age: Option<i32>,
    skills: Vec<String>,
    desired_sectors: Vec<String>,
    audio_presentation_url: Option<String>,
    profile_photo_url: Option<String>,
    completion_percentage: i32,
    experience: Option<serde_json::Value>,
}

impl From<JobSeekerProfileRow> for JobSeekerProfile {
    fn from(r: JobSeekerProfileRow) -> Self {
        JobSeekerProfile {
            id: r.id,
            user_id: r.user_id,
            location: r.location,
            age: r.age,
            skills: r.skills,
            desired_sectors: r.desired_sectors,
            audio_presentation_url: r.audio_presentation_url,
            profile_photo_url: r.profile_photo_url,
            completion_percentage: r.completion_percentage,
            experience: r.experience,
        }
    }
}

#[derive(Debug, FromRow)]
struct EmployerProfileRow {
    id: i32,
    user_id: i32,
    company_name: Option<String>,
    company_size: Option<String>,
    sector: Option<String>,
    location: Option<String>,
    description: Option<String>,
    contact_preferences: Vec<String>,
}

impl TryFrom<EmployerProfileRow> for EmployerProfile {
    type Error = StoreError;

    fn try_from(r: EmployerProfileRow) -> StoreResult<Self> {
        Ok(EmployerProfile {
            id: r.id,
            user_id: r.user_id,
            company_name: r.company_name,
            company_size: r.company_size,
            sector: r.sector,
            location: r.location,
            description: r.description,
            contact_preferences: parse_channels(&r.contact_preferences)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: i32,
    employer_id: i32,
    title: String,
    description: String,
    location: String,
    job_type: String,
    sector: String,
    start_date: Option<OffsetDateTime>,
    duration: Option<String>,
    status: String,
    created_at: OffsetDateTime,
    contact_name: String,
    contact_phone: String,
    contact_email: Option<String>,
    contact_preferences: Vec<String>,
    views: i32,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(r: JobRow) -> StoreResult<Self> {
        Ok(Job {
            id: r.id,
            employer_id: r.employer_id,
            title: r.title,
            description: r.description,
            location: r.location,
            job_type: parse(&r.job_type)?,
            sector: r.sector,
            start_date: r.start_date,
            duration: r.duration,
            status: parse(&r.status)?,
            created_at: r.created_at,
            contact_name: r.contact_name,
            contact_phone: r.contact_phone,
            contact_email: r.contact_email,
            contact_preferences: parse_channels(&r.contact_preferences)?,
            views: r.views,
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: i32,
    job_id: i32,
    job_seeker_id: i32,
    status: String,
    created_at: OffsetDateTime,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(r: ApplicationRow) -> StoreResult<Self> {
        Ok(Application {
            id: r.id,
            job_id: r.job_id,
            job_seeker_id: r.job_seeker_id,
            status: parse(&r.status)?,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SavedJobRow {
    id: i32,
    job_id: i32,
    job_seeker_id: i32,
    created_at: OffsetDateTime,
}

impl From<SavedJobRow> for SavedJob {
    fn from(r: SavedJobRow) -> Self {
        SavedJob {
            id: r.id,
            job_id: r.job_id,
            job_seeker_id: r.job_seeker_id,
            created_at: r.created_at,
        }
    }
}
