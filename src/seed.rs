//! Demo records for a fresh install (`SEED_DEMO_DATA=true`).

use time::OffsetDateTime;
use tracing::info;

use crate::auth::services::hash_password;
use crate::schema::{
    ContactChannel, EmployerProfileChanges, JobSeekerProfileChanges, JobStatus, JobType, Language,
    NewApplication, NewJob, NewUser, Role,
};
use crate::store::JobStore;

pub const DEMO_PASSWORD: &str = "test123";

/// Inserts one employer, one job seeker, a job and an application.
/// Skipped when the demo employer already exists.
pub async fn seed_demo_data(store: &dyn JobStore) -> anyhow::Result<()> {
    if store.get_user_by_username("moussa").await?.is_some() {
        info!("demo data already present; skipping seed");
        return Ok(());
    }

    let employer = store
        .create_user(NewUser {
            username: "moussa".into(),
            password_hash: hash_password(DEMO_PASSWORD)?,
            first_name: "Moussa".into(),
            last_name: "Diop".into(),
            phone: "+221777777777".into(),
            email: Some("employer@test.com".into()),
            role: Role::Employer,
            preferred_language: Language::Fr,
        })
        .await?;
    store
        .create_or_update_employer_profile(
            employer.id,
            EmployerProfileChanges {
                company_name: Some("Dakar Services".into()),
                company_size: Some("10-50".into()),
                sector: Some("services".into()),
                location: Some("Dakar, Plateau".into()),
                description: Some("Entreprise de services multiples".into()),
                contact_preferences: Some(vec![ContactChannel::Phone, ContactChannel::Whatsapp]),
            },
        )
        .await?;

    let seeker = store
        .create_user(NewUser {
            username: "fatou".into(),
            password_hash: hash_password(DEMO_PASSWORD)?,
            first_name: "Fatou".into(),
            last_name: "Sow".into(),
            phone: "+221788888888".into(),
            email: Some("jobseeker@test.com".into()),
            role: Role::JobSeeker,
            preferred_language: Language::Fr,
        })
        .await?;
    store
        .create_or_update_job_seeker_profile(
            seeker.id,
            JobSeekerProfileChanges {
                location: Some("Dakar, Medina".into()),
                age: Some(25),
                skills: Some(vec![
                    "cleaning".into(),
                    "cooking".into(),
                    "customer_service".into(),
                ]),
                desired_sectors: Some(vec!["hospitality".into(), "services".into()]),
                experience: Some(serde_json::json!("2 ans d'expérience en restauration")),
                ..Default::default()
            },
        )
        .await?;

    let job = store
        .create_job(
            employer.id,
            NewJob {
                title: "Agent d'entretien".into(),
                description: "Nous recherchons un agent d'entretien pour nos bureaux".into(),
                location: "Dakar, Plateau".into(),
                job_type: JobType::FullTime,
                sector: "services".into(),
                start_date: Some(OffsetDateTime::now_utc()),
                duration: Some("6 mois".into()),
                status: JobStatus::Active,
                contact_name: "Moussa Diop".into(),
                contact_phone: "+221777777777".into(),
                contact_email: Some("employer@test.com".into()),
                contact_preferences: vec![ContactChannel::Phone],
            },
        )
        .await?;

    store
        .create_application(NewApplication {
            job_id: job.id,
            job_seeker_id: seeker.id,
        })
        .await?;

    info!(employer_id = employer.id, job_seeker_id = seeker.id, job_id = job.id, "demo data seeded");
    Ok(())
}
