//! Helpers shared by the HTTP tests.

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};

use crate::{app::build_app, state::AppState};

pub fn server() -> TestServer {
    server_with(AppState::fake())
}

pub fn server_with(state: AppState) -> TestServer {
    TestServer::new(build_app(state)).unwrap()
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

/// Registers a user with password `secret123`; returns (access token, user id).
pub async fn register(server: &TestServer, username: &str, role: &str) -> (String, i64) {
    let res = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "password": "secret123",
            "firstName": "Test",
            "lastName": "User",
            "phone": "+221770000000",
            "role": role
        }))
        .await;
    res.assert_status(StatusCode::CREATED);
    let body: Value = res.json();
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_i64().unwrap(),
    )
}

pub fn job_body(title: &str, sector: &str, location: &str) -> Value {
    json!({
        "title": title,
        "description": "Poste à pourvoir rapidement",
        "location": location,
        "type": "full_time",
        "sector": sector,
        "contactName": "Moussa Diop",
        "contactPhone": "+221777777777",
        "contactPreferences": ["phone"]
    })
}

pub async fn post_job(server: &TestServer, token: &str, body: Value) -> i64 {
    let res = server
        .post("/api/jobs")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&body)
        .await;
    res.assert_status(StatusCode::CREATED);
    res.json::<Value>()["id"].as_i64().unwrap()
}

pub async fn apply(server: &TestServer, token: &str, job_id: i64) -> TestResponse {
    server
        .post("/api/applications")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&json!({ "jobId": job_id }))
        .await
}
