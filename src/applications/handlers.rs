use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{CreateApplicationRequest, UpdateApplicationStatusRequest};
use crate::{
    auth::{EmployerUser, JobSeekerUser},
    error::{ApiError, ApiResult},
    extract::{IdPath, ValidJson},
    schema::{
        Application, ApplicationStatus, ApplicationWithJob, ApplicationWithJobAndSeeker,
        NewApplication,
    },
    state::AppState,
};

pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/applications", post(create_application))
        .route("/job-seeker/applications", get(list_job_seeker_applications))
        .route("/employer/applications", get(list_employer_applications))
        .route("/employer/applications/:id", patch(update_application_status))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn create_application(
    State(state): State<AppState>,
    JobSeekerUser(user): JobSeekerUser,
    ValidJson(payload): ValidJson<CreateApplicationRequest>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    let application = state
        .store
        .create_application(NewApplication {
            job_id: payload.job_id,
            job_seeker_id: user.id,
        })
        .await?;
    info!(application_id = application.id, job_id = application.job_id, "application submitted");
    Ok((StatusCode::CREATED, Json(application)))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_job_seeker_applications(
    State(state): State<AppState>,
    JobSeekerUser(user): JobSeekerUser,
) -> ApiResult<Json<Vec<ApplicationWithJob>>> {
    Ok(Json(
        state.store.get_applications_by_job_seeker_id(user.id).await?,
    ))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_employer_applications(
    State(state): State<AppState>,
    EmployerUser(user): EmployerUser,
) -> ApiResult<Json<Vec<ApplicationWithJobAndSeeker>>> {
    Ok(Json(state.store.get_applications_by_employer_id(user.id).await?))
}

/// Accept or reject an application to one of the caller's jobs.
#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn update_application_status(
    State(state): State<AppState>,
    EmployerUser(user): EmployerUser,
    IdPath(id): IdPath,
    ValidJson(payload): ValidJson<UpdateApplicationStatusRequest>,
) -> ApiResult<Json<Application>> {
    if payload.status == ApplicationStatus::Pending {
        return Err(ApiError::invalid(
            "status",
            "transition",
            "status must be accepted or rejected",
        ));
    }

    let Some(id) = id else {
        return Err(ApiError::not_found("Application not found"));
    };
    let current = state
        .store
        .get_application(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;
    if current.job.employer_id != user.id {
        warn!(application_id = id, "application belongs to another employer");
        return Err(ApiError::forbidden("Access denied"));
    }

    let updated = state.store.update_application_status(id, payload.status).await?;
    info!(application_id = id, status = %updated.status, "application decided");
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use axum::http::{header::AUTHORIZATION, StatusCode};
    use serde_json::{json, Value};

    use crate::state::AppState;
    use crate::store::StoreOptions;
    use crate::test_support::{apply, bearer, job_body, post_job, register, server, server_with};

    #[tokio::test]
    async fn job_seeker_applies_once() {
        let server = server();
        let (employer, _) = register(&server, "moussa", "employer").await;
        let (seeker, seeker_id) = register(&server, "fatou", "job_seeker").await;
        let job_id = post_job(&server, &employer, job_body("Agent", "services", "Dakar")).await;

        let res = apply(&server, &seeker, job_id).await;
        res.assert_status(StatusCode::CREATED);
        let app: Value = res.json();
        assert_eq!(app["status"], "pending");
        assert_eq!(app["jobId"], job_id);
        assert_eq!(app["jobSeekerId"], seeker_id);

        apply(&server, &seeker, job_id).await.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn duplicates_are_accepted_when_enabled() {
        let server = server_with(AppState::fake_with(StoreOptions {
            allow_duplicate_applications: true,
        }));
        let (employer, _) = register(&server, "moussa", "employer").await;
        let (seeker, _) = register(&server, "fatou", "job_seeker").await;
        let job_id = post_job(&server, &employer, job_body("Agent", "services", "Dakar")).await;

        apply(&server, &seeker, job_id).await.assert_status(StatusCode::CREATED);
        apply(&server, &seeker, job_id).await.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn applying_checks_role_and_job() {
        let server = server();
        let (employer, _) = register(&server, "moussa", "employer").await;
        let (seeker, _) = register(&server, "fatou", "job_seeker").await;

        apply(&server, &employer, 1).await.assert_status(StatusCode::FORBIDDEN);
        apply(&server, &seeker, 0).await.assert_status(StatusCode::BAD_REQUEST);
        apply(&server, &seeker, 4242).await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listings_join_jobs_and_seekers() {
        let server = server();
        let (employer, _) = register(&server, "moussa", "employer").await;
        let (other_employer, _) = register(&server, "aminata", "employer").await;
        let (seeker, _) = register(&server, "fatou", "job_seeker").await;
        let job_id = post_job(&server, &employer, job_body("Agent", "services", "Dakar")).await;
        apply(&server, &seeker, job_id).await;

        let mine: Vec<Value> = server
            .get("/api/job-seeker/applications")
            .add_header(AUTHORIZATION, bearer(&seeker))
            .await
            .json();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0]["job"]["title"], "Agent");

        let received: Vec<Value> = server
            .get("/api/employer/applications")
            .add_header(AUTHORIZATION, bearer(&employer))
            .await
            .json();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["jobSeeker"]["username"], "fatou");
        assert!(received[0]["jobSeeker"].get("passwordHash").is_none());
        assert_eq!(received[0]["job"]["id"], job_id);

        let others: Vec<Value> = server
            .get("/api/employer/applications")
            .add_header(AUTHORIZATION, bearer(&other_employer))
            .await
            .json();
        assert!(others.is_empty());

        server
            .get("/api/employer/applications")
            .add_header(AUTHORIZATION, bearer(&seeker))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn owning_employer_decides_once() {
        let server = server();
        let (employer, _) = register(&server, "moussa", "employer").await;
        let (other_employer, _) = register(&server, "aminata", "employer").await;
        let (seeker, _) = register(&server, "fatou", "job_seeker").await;
        let job_id = post_job(&server, &employer, job_body("Agent", "services", "Dakar")).await;
        let app_id = apply(&server, &seeker, job_id).await.json::<Value>()["id"]
            .as_i64()
            .unwrap();
        let path = format!("/api/employer/applications/{app_id}");

        server
            .patch(&path)
            .add_header(AUTHORIZATION, bearer(&other_employer))
            .json(&json!({ "status": "accepted" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .patch(&path)
            .add_header(AUTHORIZATION, bearer(&employer))
            .json(&json!({ "status": "pending" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let res = server
            .patch(&path)
            .add_header(AUTHORIZATION, bearer(&employer))
            .json(&json!({ "status": "accepted" }))
            .await;
        res.assert_status(StatusCode::OK);
        assert_eq!(res.json::<Value>()["status"], "accepted");

        server
            .patch(&path)
            .add_header(AUTHORIZATION, bearer(&employer))
            .json(&json!({ "status": "rejected" }))
            .await
            .assert_status(StatusCode::CONFLICT);
        server
            .patch("/api/employer/applications/999")
            .add_header(AUTHORIZATION, bearer(&employer))
            .json(&json!({ "status": "rejected" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deciding_a_malformed_id_is_not_found() {
        let server = server();
        let (employer, _) = register(&server, "moussa", "employer").await;

        let res = server
            .patch("/api/employer/applications/abc")
            .add_header(AUTHORIZATION, bearer(&employer))
            .json(&json!({ "status": "accepted" }))
            .await;
        res.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(res.json::<Value>()["message"], "Application not found");
    }
}
