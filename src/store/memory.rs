use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{newest_first, JobStore, StoreError, StoreOptions, StoreResult};
use crate::schema::{
    completion_percentage, Application, ApplicationStatus, ApplicationWithJob,
    ApplicationWithJobAndSeeker, EmployerProfile, EmployerProfileChanges, EmployerWithProfile,
    Job, JobFilters, JobSeekerProfile, JobSeekerProfileChanges, JobWithEmployer, NewApplication,
    NewJob, NewSavedJob, NewUser, Role, SavedJob, SavedJobWithJob, User, UserWithProfile,
};

/// In-process store. All tables live behind one lock so that every
/// read-modify-write (id allocation, upserts, view counts, bookmark checks)
/// is atomic.
pub struct MemStore {
    tables: RwLock<Tables>,
    options: StoreOptions,
}

#[derive(Default)]
struct Sequences {
    user: i32,
    job_seeker_profile: i32,
    employer_profile: i32,
    job: i32,
    application: i32,
    saved_job: i32,
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

type Pair = (i32, i32); // (job id, job seeker id)

#[derive(Default)]
struct Tables {
    seq: Sequences,

    users: HashMap<i32, User>,
    user_by_username: HashMap<String, i32>,

    job_seeker_profiles: HashMap<i32, JobSeekerProfile>,
    job_seeker_profile_by_user: HashMap<i32, i32>,
    employer_profiles: HashMap<i32, EmployerProfile>,
    employer_profile_by_user: HashMap<i32, i32>,

    jobs: HashMap<i32, Job>,
    jobs_by_employer: HashMap<i32, BTreeSet<i32>>,

    applications: HashMap<i32, Application>,
    applications_by_seeker: HashMap<i32, BTreeSet<i32>>,
    applications_by_job: HashMap<i32, BTreeSet<i32>>,
    application_by_pair: HashMap<Pair, i32>,

    saved_jobs: HashMap<i32, SavedJob>,
    saved_job_by_pair: HashMap<Pair, i32>,
    saved_jobs_by_seeker: HashMap<i32, BTreeSet<i32>>,
}

impl Tables {
    fn job_seeker_profile_of(&self, user_id: i32) -> Option<&JobSeekerProfile> {
        self.job_seeker_profile_by_user
            .get(&user_id)
            .and_then(|id| self.job_seeker_profiles.get(id))
    }

    fn employer_profile_of(&self, user_id: i32) -> Option<&EmployerProfile> {
        self.employer_profile_by_user
            .get(&user_id)
            .and_then(|id| self.employer_profiles.get(id))
    }

    fn with_employer(&self, job: &Job) -> Option<JobWithEmployer> {
        let Some(user) = self.users.get(&job.employer_id) else {
            warn!(job_id = job.id, employer_id = job.employer_id, "job without employer");
            return None;
        };
        Some(JobWithEmployer {
            job: job.clone(),
            employer: EmployerWithProfile {
                user: user.clone(),
                employer_profile: self.employer_profile_of(user.id).cloned(),
            },
        })
    }

    fn applications_in<'a>(&'a self, ids: impl Iterator<Item = &'a i32>) -> Vec<&'a Application> {
        let mut apps: Vec<&Application> = ids.filter_map(|id| self.applications.get(id)).collect();
        newest_first(&mut apps, |a| (a.created_at, a.id));
        apps
    }
}

impl MemStore {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            options,
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

#[async_trait]
impl JobStore for MemStore {
    async fn get_user(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t
            .user_by_username
            .get(username)
            .and_then(|id| t.users.get(id))
            .cloned())
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.user_by_username.contains_key(&new.username) {
            return Err(StoreError::DuplicateUsername(new.username));
        }
        let id = next_id(&mut t.seq.user);
        let user = User {
            id,
            username: new.username,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            email: new.email,
            role: new.role,
            preferred_language: new.preferred_language,
            created_at: OffsetDateTime::now_utc(),
        };
        t.user_by_username.insert(user.username.clone(), id);
        t.users.insert(id, user.clone());
        debug!(user_id = id, "user stored");
        Ok(user)
    }

    async fn get_user_with_profile(&self, id: i32) -> StoreResult<Option<UserWithProfile>> {
        let t = self.tables.read().await;
        let Some(user) = t.users.get(&id) else {
            return Ok(None);
        };
        let (job_seeker_profile, employer_profile) = match user.role {
            Role::JobSeeker => (t.job_seeker_profile_of(id).cloned(), None),
            Role::Employer => (None, t.employer_profile_of(id).cloned()),
        };
        Ok(Some(UserWithProfile {
            user: user.clone(),
            job_seeker_profile,
            employer_profile,
        }))
    }

    async fn create_or_update_job_seeker_profile(
        &self,
        user_id: i32,
        changes: JobSeekerProfileChanges,
    ) -> StoreResult<JobSeekerProfile> {
        let mut t = self.tables.write().await;
        let user = t
            .users
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::UserNotFound(user_id))?;

        let existing = t.job_seeker_profile_of(user_id).cloned();
        let mut profile = match existing {
            Some(existing) => existing,
            None => JobSeekerProfile {
                id: next_id(&mut t.seq.job_seeker_profile),
                user_id,
                location: None,
                age: None,
                skills: Vec::new(),
                desired_sectors: Vec::new(),
                audio_presentation_url: None,
                profile_photo_url: None,
                completion_percentage: 0,
                experience: None,
            },
        };
        changes.apply_to(&mut profile);
        profile.completion_percentage = completion_percentage(&user, &profile);

        t.job_seeker_profile_by_user.insert(user_id, profile.id);
        t.job_seeker_profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn create_or_update_employer_profile(
        &self,
        user_id: i32,
        changes: EmployerProfileChanges,
    ) -> StoreResult<EmployerProfile> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            return Err(StoreError::UserNotFound(user_id));
        }

        let existing = t.employer_profile_of(user_id).cloned();
        let mut profile = match existing {
            Some(existing) => existing,
            None => EmployerProfile {
                id: next_id(&mut t.seq.employer_profile),
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

        t.employer_profile_by_user.insert(user_id, profile.id);
        t.employer_profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn create_job(&self, employer_id: i32, new: NewJob) -> StoreResult<Job> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&employer_id) {
            return Err(StoreError::UserNotFound(employer_id));
        }
        let id = next_id(&mut t.seq.job);
        let job = Job {
            id,
            employer_id,
            title: new.title,
            description: new.description,
            location: new.location,
            job_type: new.job_type,
            sector: new.sector,
            start_date: new.start_date,
            duration: new.duration,
            status: new.status,
            created_at: OffsetDateTime::now_utc(),
            contact_name: new.contact_name,
            contact_phone: new.contact_phone,
            contact_email: new.contact_email,
            contact_preferences: new.contact_preferences,
            views: 0,
        };
        t.jobs_by_employer.entry(employer_id).or_default().insert(id);
        t.jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn get_jobs(&self, filters: &JobFilters) -> StoreResult<Vec<JobWithEmployer>> {
        let t = self.tables.read().await;
        let mut jobs: Vec<&Job> = t.jobs.values().filter(|j| filters.matches(j)).collect();
        newest_first(&mut jobs, |j| (j.created_at, j.id));
        Ok(jobs.into_iter().filter_map(|j| t.with_employer(j)).collect())
    }

    async fn get_job_by_id(&self, id: i32) -> StoreResult<Option<JobWithEmployer>> {
        let t = self.tables.read().await;
        Ok(t.jobs.get(&id).and_then(|j| t.with_employer(j)))
    }

    async fn get_jobs_by_employer_id(&self, employer_id: i32) -> StoreResult<Vec<Job>> {
        let t = self.tables.read().await;
        let mut jobs: Vec<Job> = t
            .jobs_by_employer
            .get(&employer_id)
            .into_iter()
            .flatten()
            .filter_map(|id| t.jobs.get(id).cloned())
            .collect();
        newest_first(&mut jobs, |j| (j.created_at, j.id));
        Ok(jobs)
    }

    async fn increment_job_views(&self, job_id: i32) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if let Some(job) = t.jobs.get_mut(&job_id) {
            job.views += 1;
        }
        Ok(())
    }

    async fn create_application(&self, new: NewApplication) -> StoreResult<Application> {
        let mut t = self.tables.write().await;
        if !t.jobs.contains_key(&new.job_id) {
            return Err(StoreError::JobNotFound(new.job_id));
        }
        let pair = (new.job_id, new.job_seeker_id);
        if !self.options.allow_duplicate_applications && t.application_by_pair.contains_key(&pair)
        {
            return Err(StoreError::DuplicateApplication {
                job_id: new.job_id,
                job_seeker_id: new.job_seeker_id,
            });
        }

        let id = next_id(&mut t.seq.application);
        let application = Application {
            id,
            job_id: new.job_id,
            job_seeker_id: new.job_seeker_id,
            status: ApplicationStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
        };
        t.application_by_pair.entry(pair).or_insert(id);
        t.applications_by_seeker
            .entry(new.job_seeker_id)
            .or_default()
            .insert(id);
        t.applications_by_job.entry(new.job_id).or_default().insert(id);
        t.applications.insert(id, application.clone());
        Ok(application)
    }

    async fn get_application(&self, id: i32) -> StoreResult<Option<ApplicationWithJob>> {
        let t = self.tables.read().await;
        Ok(t.applications.get(&id).and_then(|a| {
            t.jobs.get(&a.job_id).map(|job| ApplicationWithJob {
                application: a.clone(),
                job: job.clone(),
            })
        }))
    }

    async fn get_applications_by_job_seeker_id(
        &self,
        job_seeker_id: i32,
    ) -> StoreResult<Vec<ApplicationWithJob>> {
        let t = self.tables.read().await;
        let ids = t.applications_by_seeker.get(&job_seeker_id).into_iter().flatten();
        Ok(t
            .applications_in(ids)
            .into_iter()
            .filter_map(|a| {
                t.jobs.get(&a.job_id).map(|job| ApplicationWithJob {
                    application: a.clone(),
                    job: job.clone(),
                })
            })
            .collect())
    }

    async fn get_applications_by_employer_id(
        &self,
        employer_id: i32,
    ) -> StoreResult<Vec<ApplicationWithJobAndSeeker>> {
        let t = self.tables.read().await;
        let ids = t
            .jobs_by_employer
            .get(&employer_id)
            .into_iter()
            .flatten()
            .filter_map(|job_id| t.applications_by_job.get(job_id))
            .flatten();
        Ok(t
            .applications_in(ids)
            .into_iter()
            .filter_map(|a| {
                let job = t.jobs.get(&a.job_id)?;
                let job_seeker = t.users.get(&a.job_seeker_id)?;
                Some(ApplicationWithJobAndSeeker {
                    application: a.clone(),
                    job: job.clone(),
                    job_seeker: job_seeker.clone(),
                })
            })
            .collect())
    }

    async fn update_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> StoreResult<Application> {
        let mut t = self.tables.write().await;
        let application = t
            .applications
            .get_mut(&id)
            .ok_or(StoreError::ApplicationNotFound(id))?;
        if !application.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: application.status,
                to: status,
            });
        }
        application.status = status;
        Ok(application.clone())
    }

    async fn save_job(&self, new: NewSavedJob) -> StoreResult<SavedJob> {
        let mut t = self.tables.write().await;
        let pair = (new.job_id, new.job_seeker_id);
        if let Some(existing) = t
            .saved_job_by_pair
            .get(&pair)
            .and_then(|id| t.saved_jobs.get(id))
        {
            return Ok(existing.clone());
        }
        if !t.jobs.contains_key(&new.job_id) {
            return Err(StoreError::JobNotFound(new.job_id));
        }

        let id = next_id(&mut t.seq.saved_job);
        let saved = SavedJob {
            id,
            job_id: new.job_id,
            job_seeker_id: new.job_seeker_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.saved_job_by_pair.insert(pair, id);
        t.saved_jobs_by_seeker
            .entry(new.job_seeker_id)
            .or_default()
            .insert(id);
        t.saved_jobs.insert(id, saved.clone());
        Ok(saved)
    }

    async fn remove_saved_job(&self, job_id: i32, job_seeker_id: i32) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if let Some(id) = t.saved_job_by_pair.remove(&(job_id, job_seeker_id)) {
            t.saved_jobs.remove(&id);
            if let Some(ids) = t.saved_jobs_by_seeker.get_mut(&job_seeker_id) {
                ids.remove(&id);
            }
        }
        Ok(())
    }

    async fn get_saved_jobs_by_job_seeker_id(
        &self,
        job_seeker_id: i32,
    ) -> StoreResult<Vec<SavedJobWithJob>> {
        let t = self.tables.read().await;
        let mut saved: Vec<&SavedJob> = t
            .saved_jobs_by_seeker
            .get(&job_seeker_id)
            .into_iter()
            .flatten()
            .filter_map(|id| t.saved_jobs.get(id))
            .collect();
        newest_first(&mut saved, |s| (s.created_at, s.id));
        Ok(saved
            .into_iter()
            .filter_map(|s| {
                t.jobs.get(&s.job_id).map(|job| SavedJobWithJob {
                    saved_job: s.clone(),
                    job: job.clone(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::{ContactChannel, JobStatus, JobType, Language};

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.into(),
            password_hash: "hash".into(),
            first_name: "Awa".into(),
            last_name: "Ndiaye".into(),
            phone: "+221770000000".into(),
            email: None,
            role,
            preferred_language: Language::Fr,
        }
    }

    fn new_job(title: &str, sector: &str, location: &str) -> NewJob {
        NewJob {
            title: title.into(),
            description: "Entretien des bureaux".into(),
            location: location.into(),
            job_type: JobType::FullTime,
            sector: sector.into(),
            start_date: None,
            duration: Some("6 mois".into()),
            status: JobStatus::Active,
            contact_name: "Moussa Diop".into(),
            contact_phone: "+221777777777".into(),
            contact_email: None,
            contact_preferences: vec![ContactChannel::Phone, ContactChannel::Whatsapp],
        }
    }

    async fn seeded() -> (MemStore, User, User) {
        let store = MemStore::default();
        let employer = store
            .create_user(new_user("moussa", Role::Employer))
            .await
            .unwrap();
        let seeker = store
            .create_user(new_user("fatou", Role::JobSeeker))
            .await
            .unwrap();
        (store, employer, seeker)
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let (store, _, _) = seeded().await;
        let err = store
            .create_user(new_user("moussa", Role::JobSeeker))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername(name) if name == "moussa"));
        let found = store.get_user_by_username("fatou").await.unwrap().unwrap();
        assert_eq!(found.role, Role::JobSeeker);
        assert!(store.get_user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_upsert_merges_into_a_single_record() {
        let (store, _, seeker) = seeded().await;
        let first = store
            .create_or_update_job_seeker_profile(
                seeker.id,
                JobSeekerProfileChanges {
                    location: Some("Dakar, Medina".into()),
                    skills: Some(vec!["cleaning".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = store
            .create_or_update_job_seeker_profile(
                seeker.id,
                JobSeekerProfileChanges {
                    age: Some(25),
                    skills: Some(vec!["cooking".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.location.as_deref(), Some("Dakar, Medina"));
        assert_eq!(second.skills, vec!["cooking".to_string()]);
        assert_eq!(second.age, Some(25));
        // names, phone, location, skills
        assert_eq!(second.completion_percentage, 56);

        let with_profile = store.get_user_with_profile(seeker.id).await.unwrap().unwrap();
        assert_eq!(with_profile.job_seeker_profile, Some(second));
        assert!(with_profile.employer_profile.is_none());
        assert_eq!(store.tables.read().await.job_seeker_profiles.len(), 1);
    }

    #[tokio::test]
    async fn profile_upsert_requires_a_user() {
        let store = MemStore::default();
        let err = store
            .create_or_update_employer_profile(42, EmployerProfileChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound(42)));
    }

    #[tokio::test]
    async fn job_detail_embeds_employer_and_profile() {
        let (store, employer, _) = seeded().await;
        let profile = store
            .create_or_update_employer_profile(
                employer.id,
                EmployerProfileChanges {
                    company_name: Some("Dakar Services".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let job = store
            .create_job(employer.id, new_job("Agent", "services", "Dakar"))
            .await
            .unwrap();
        assert_eq!(job.views, 0);

        let found = store.get_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(found.employer.user.id, employer.id);
        assert_eq!(found.employer.employer_profile, Some(profile));
        assert_eq!(found.job.views, 0);
        assert!(store.get_job_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn jobs_are_filtered_and_listed_newest_first() {
        let (store, employer, _) = seeded().await;
        let tech = store
            .create_job(employer.id, new_job("Dev", "technology", "Dakar, Plateau"))
            .await
            .unwrap();
        let retail = store
            .create_job(employer.id, new_job("Vendeur", "retail", "Thiès"))
            .await
            .unwrap();

        let all = store.get_jobs(&JobFilters::default()).await.unwrap();
        let ids: Vec<i32> = all.iter().map(|j| j.job.id).collect();
        assert_eq!(ids, vec![retail.id, tech.id]);

        let by_sector = store
            .get_jobs(&JobFilters {
                sector: Some("technology".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_sector.len(), 1);
        assert_eq!(by_sector[0].job.id, tech.id);

        let by_location = store
            .get_jobs(&JobFilters {
                location: Some("dakar".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_location.len(), 1);
        assert_eq!(by_location[0].job.location, "Dakar, Plateau");

        let closed = store
            .get_jobs(&JobFilters {
                status: Some(JobStatus::Closed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(closed.is_empty());

        let mine = store.get_jobs_by_employer_id(employer.id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, retail.id);
    }

    #[tokio::test]
    async fn concurrent_view_increments_are_not_lost() {
        let (store, employer, _) = seeded().await;
        let store = Arc::new(store);
        let a = store
            .create_job(employer.id, new_job("A", "services", "Dakar"))
            .await
            .unwrap();
        let b = store
            .create_job(employer.id, new_job("B", "services", "Dakar"))
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            let id = if i % 2 == 0 { a.id } else { b.id };
            tasks.push(tokio::spawn(async move {
                store.increment_job_views(id).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        store.increment_job_views(12345).await.unwrap();

        let a = store.get_job_by_id(a.id).await.unwrap().unwrap();
        let b = store.get_job_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(a.job.views, 25);
        assert_eq!(b.job.views, 25);
    }

    #[tokio::test]
    async fn saving_twice_keeps_one_bookmark() {
        let (store, employer, seeker) = seeded().await;
        let job = store
            .create_job(employer.id, new_job("A", "services", "Dakar"))
            .await
            .unwrap();
        let pair = NewSavedJob {
            job_id: job.id,
            job_seeker_id: seeker.id,
        };

        let first = store.save_job(pair).await.unwrap();
        let second = store.save_job(pair).await.unwrap();
        assert_eq!(first, second);

        let saved = store.get_saved_jobs_by_job_seeker_id(seeker.id).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].job.id, job.id);

        store.remove_saved_job(job.id, seeker.id).await.unwrap();
        store.remove_saved_job(job.id, seeker.id).await.unwrap();
        assert!(store
            .get_saved_jobs_by_job_seeker_id(seeker.id)
            .await
            .unwrap()
            .is_empty());

        let err = store
            .save_job(NewSavedJob {
                job_id: 77,
                job_seeker_id: seeker.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::JobNotFound(77)));
    }

    #[tokio::test]
    async fn duplicate_applications_follow_the_option() {
        let (store, employer, seeker) = seeded().await;
        let job = store
            .create_job(employer.id, new_job("A", "services", "Dakar"))
            .await
            .unwrap();
        let new = NewApplication {
            job_id: job.id,
            job_seeker_id: seeker.id,
        };
        let app = store.create_application(new).await.unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert!(matches!(
            store.create_application(new).await.unwrap_err(),
            StoreError::DuplicateApplication { .. }
        ));

        let lenient = MemStore::new(StoreOptions {
            allow_duplicate_applications: true,
        });
        let employer = lenient
            .create_user(new_user("e", Role::Employer))
            .await
            .unwrap();
        let seeker = lenient
            .create_user(new_user("s", Role::JobSeeker))
            .await
            .unwrap();
        let job = lenient
            .create_job(employer.id, new_job("A", "services", "Dakar"))
            .await
            .unwrap();
        let new = NewApplication {
            job_id: job.id,
            job_seeker_id: seeker.id,
        };
        lenient.create_application(new).await.unwrap();
        lenient.create_application(new).await.unwrap();
        assert_eq!(
            lenient
                .get_applications_by_job_seeker_id(seeker.id)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn employer_sees_only_applications_to_own_jobs() {
        let (store, employer, seeker) = seeded().await;
        let other = store
            .create_user(new_user("other", Role::Employer))
            .await
            .unwrap();
        let mine = store
            .create_job(employer.id, new_job("Mine", "services", "Dakar"))
            .await
            .unwrap();
        let theirs = store
            .create_job(other.id, new_job("Theirs", "retail", "Thiès"))
            .await
            .unwrap();
        for job_id in [mine.id, theirs.id] {
            store
                .create_application(NewApplication {
                    job_id,
                    job_seeker_id: seeker.id,
                })
                .await
                .unwrap();
        }

        let received = store.get_applications_by_employer_id(employer.id).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].job.id, mine.id);
        assert_eq!(received[0].job.employer_id, employer.id);
        assert_eq!(received[0].job_seeker.id, seeker.id);

        let sent = store.get_applications_by_job_seeker_id(seeker.id).await.unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].job.id, theirs.id);
    }

    #[tokio::test]
    async fn application_status_moves_out_of_pending_once() {
        let (store, employer, seeker) = seeded().await;
        let job = store
            .create_job(employer.id, new_job("A", "services", "Dakar"))
            .await
            .unwrap();
        let app = store
            .create_application(NewApplication {
                job_id: job.id,
                job_seeker_id: seeker.id,
            })
            .await
            .unwrap();

        let accepted = store
            .update_application_status(app.id, ApplicationStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(accepted.status, ApplicationStatus::Accepted);
        assert!(matches!(
            store
                .update_application_status(app.id, ApplicationStatus::Rejected)
                .await
                .unwrap_err(),
            StoreError::InvalidTransition { .. }
        ));
        assert!(matches!(
            store
                .update_application_status(99, ApplicationStatus::Rejected)
                .await
                .unwrap_err(),
            StoreError::ApplicationNotFound(99)
        ));
    }
}
