use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
        services::{hash_password, is_valid_username, verify_password, JwtKeys},
        CurrentUser,
    },
    error::{ApiError, ApiResult},
    extract::ValidJson,
    schema::{NewUser, User, UserWithProfile},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/user", get(get_me))
}

fn issue_tokens(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    Ok(AuthResponse {
        token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        user,
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let username = payload.username.trim().to_string();
    if !is_valid_username(&username) {
        warn!(%username, "invalid username");
        return Err(ApiError::invalid(
            "username",
            "format",
            "Username may only contain letters, digits, '_', '.' and '-'",
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(NewUser {
            username,
            password_hash,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            email: payload.email.map(|e| e.trim().to_lowercase()),
            role: payload.role,
            preferred_language: payload.preferred_language,
        })
        .await?;

    info!(user_id = user.id, username = %user.username, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let username = payload.username.trim();
    let Some(user) = state.store.get_user_by_username(username).await? else {
        warn!(%username, "login unknown username");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    info!(user_id = user.id, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        ApiError::unauthorized("Invalid refresh token")
    })?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<UserWithProfile>> {
    let full = state
        .store
        .get_user_with_profile(user.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;
    Ok(Json(full))
}

#[cfg(test)]
mod tests {
    use axum::http::{header::AUTHORIZATION, StatusCode};
    use serde_json::{json, Value};

    use crate::test_support::{bearer, register, server};

    #[tokio::test]
    async fn register_returns_tokens_without_password() {
        let server = server();
        let res = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "fatou",
                "password": "secret1",
                "firstName": "Fatou",
                "lastName": "Sow",
                "phone": "+221788888888",
                "email": "",
                "role": "job_seeker"
            }))
            .await;
        res.assert_status(StatusCode::CREATED);
        let body: Value = res.json();
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(body["refreshToken"].as_str().is_some());
        assert_eq!(body["user"]["username"], "fatou");
        assert_eq!(body["user"]["preferredLanguage"], "fr");
        assert!(body["user"]["email"].is_null());
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let server = server();
        register(&server, "moussa", "employer").await;
        let res = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "moussa",
                "password": "secret1",
                "firstName": "M",
                "lastName": "D",
                "phone": "1",
                "role": "employer"
            }))
            .await;
        res.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_validates_fields() {
        let server = server();
        let res = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "awa",
                "password": "123",
                "firstName": "",
                "lastName": "Ndiaye",
                "phone": "+221",
                "email": "not-an-email",
                "role": "job_seeker"
            }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str())
            .collect();
        assert_eq!(fields, vec!["email", "firstName", "password"]);
    }

    #[tokio::test]
    async fn login_checks_password() {
        let server = server();
        register(&server, "awa", "job_seeker").await;

        server
            .post("/api/auth/login")
            .json(&json!({ "username": "awa", "password": "wrong-pass" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let res = server
            .post("/api/auth/login")
            .json(&json!({ "username": "awa", "password": "secret123" }))
            .await;
        res.assert_status(StatusCode::OK);
        assert_eq!(res.json::<Value>()["user"]["username"], "awa");
    }

    #[tokio::test]
    async fn refresh_issues_new_pair_and_rejects_access_tokens() {
        let server = server();
        let res = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "ibou",
                "password": "secret1",
                "firstName": "Ibrahima",
                "lastName": "Fall",
                "phone": "+221700000000",
                "role": "job_seeker"
            }))
            .await;
        let body: Value = res.json();
        let access = body["token"].as_str().unwrap().to_string();
        let refresh = body["refreshToken"].as_str().unwrap().to_string();

        let res = server
            .post("/api/auth/refresh")
            .json(&json!({ "refreshToken": refresh }))
            .await;
        res.assert_status(StatusCode::OK);
        assert_eq!(res.json::<Value>()["user"]["username"], "ibou");

        server
            .post("/api/auth/refresh")
            .json(&json!({ "refreshToken": access }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn current_user_requires_token() {
        let server = server();
        server.get("/api/user").await.assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/user")
            .add_header(AUTHORIZATION, bearer("garbage"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let (token, id) = register(&server, "fatou", "job_seeker").await;
        let res = server.get("/api/user").add_header(AUTHORIZATION, bearer(&token)).await;
        res.assert_status(StatusCode::OK);
        let body: Value = res.json();
        assert_eq!(body["id"], id);
        assert_eq!(body["role"], "job_seeker");
    }
}
