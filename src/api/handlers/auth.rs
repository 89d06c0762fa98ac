use axum::{Json, extract::State, http::HeaderMap};

use crate::{
    AppState,
    api::models::{
        auth::{
            CsrfInfo, CsrfResponse, LoginInfo, LoginRequest, LoginResponse, LogoutInfo, LogoutResponse, RegisterInfo,
            RegisterRequest, RegisterResponse,
        },
        maintainers::{CurrentMaintainer, MaintainerResponse},
    },
    auth::{
        current_maintainer::{token_from_cookie, token_from_header},
        password::{self, Argon2Params},
        session,
    },
    db::{
        handlers::{Maintainers, Repository, Tokens},
        models::maintainers::MaintainerCreateDBRequest,
    },
    errors::Error,
};

/// Register a new maintainer account
#[utoipa::path(
    post,
    path = "/api/register/",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Maintainer registered, session cookie set", body = RegisterInfo),
        (status = 400, description = "Missing or invalid fields, or email already taken"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<RegisterResponse, Error> {
    let data = request.validate(&state.config.password)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    // Pre-check for a friendlier message; the unique index still backstops races
    let mut maintainer_repo = Maintainers::new(&mut tx);
    if maintainer_repo.get_by_email(&data.email).await?.is_some() {
        return Err(Error::validation("email", "maintainer with this email already exists."));
    }

    // Hash the password on a blocking thread to avoid stalling the async runtime
    let params = Argon2Params::from(&state.config.password);
    let password = data.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, params))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let create_request = MaintainerCreateDBRequest {
        name: data.name,
        email: data.email,
        password_hash,
        is_admin: false,
    };
    let maintainer = maintainer_repo.create(&create_request).await?;

    let token = Tokens::new(&mut tx).get_or_create_for_maintainer(maintainer.id).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let cookie = session::session_cookie(&token.key, &state.config);

    Ok(RegisterResponse {
        info: RegisterInfo {
            message: "Maintainer registered".to_string(),
            maintainer_id: maintainer.id,
        },
        cookie,
    })
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/login/",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Logged in, session cookie set", body = LoginInfo),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse, Error> {
    let data = request.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let maintainer = Maintainers::new(&mut conn)
        .get_by_email(&data.username)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Unable to log in with provided credentials.".to_string()),
        })?;

    // Verify the password on a blocking thread to avoid stalling the async runtime
    let password = data.password;
    let hash = maintainer.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Unable to log in with provided credentials.".to_string()),
        });
    }

    let token = Tokens::new(&mut conn).get_or_create_for_maintainer(maintainer.id).await?;
    let cookie = session::session_cookie(&token.key, &state.config);

    Ok(LoginResponse {
        info: LoginInfo {
            message: "Logged in".to_string(),
            maintainer_id: maintainer.id,
            email: maintainer.email,
        },
        cookie,
    })
}

/// Log out, revoking the presented token
#[utoipa::path(
    post,
    path = "/api/logout/",
    tag = "authentication",
    responses(
        (status = 200, description = "Logged out, session cookie cleared", body = LogoutInfo),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<LogoutResponse, Error> {
    // Logout is idempotent: absent, malformed, or already-revoked credentials
    // still clear the cookie and return 200.
    let presented = match token_from_header(&headers) {
        Some(Ok(key)) => Some(key),
        _ => token_from_cookie(&headers, &state.config).and_then(|key| key.ok()),
    };

    if let Some(key) = presented {
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut token_repo = Tokens::new(&mut conn);
        if let Some(token) = token_repo.get_by_key(&key).await? {
            token_repo.delete_for_maintainer(token.maintainer_id).await?;
        }
    }

    Ok(LogoutResponse {
        info: LogoutInfo {
            message: "Logged out".to_string(),
        },
        cookie: session::clear_session_cookie(&state.config),
    })
}

/// Get the authenticated maintainer's profile
#[utoipa::path(
    get,
    path = "/api/user/",
    tag = "authentication",
    responses(
        (status = 200, description = "Authenticated maintainer profile", body = MaintainerResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(
        ("token" = []),
        ("session_cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn user_info(current_maintainer: CurrentMaintainer) -> Result<Json<MaintainerResponse>, Error> {
    Ok(Json(MaintainerResponse::from(current_maintainer)))
}

/// Obtain a CSRF cookie
#[utoipa::path(
    get,
    path = "/api/csrf/",
    tag = "authentication",
    responses(
        (status = 200, description = "CSRF cookie set", body = CsrfInfo),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn csrf(State(state): State<AppState>) -> Result<CsrfResponse, Error> {
    let token = password::generate_token();

    Ok(CsrfResponse {
        info: CsrfInfo {
            detail: "CSRF cookie set".to_string(),
        },
        cookie: session::csrf_cookie(&token, &state.config),
    })
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{auth_header, create_test_app, create_test_maintainer, create_test_token};
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_success(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/api/register/")
            .json(&json!({
                "email": "new@example.com",
                "name": "New Maintainer",
                "password": "longenoughpassword"
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Maintainer registered");
        assert!(body["maintainer_id"].is_i64());

        let cookie = response.cookie("auth_token");
        assert!(!cookie.value().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_email(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let payload = json!({
            "email": "dup@example.com",
            "name": "First",
            "password": "longenoughpassword"
        });
        app.post("/api/register/").json(&payload).await.assert_status_ok();

        let response = app.post("/api/register/").json(&payload).await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["email"][0], "maintainer with this email already exists.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_missing_fields(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.post("/api/register/").json(&json!({"email": "x@example.com"})).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["name"][0], "This field is required.");
        assert_eq!(body["password"][0], "This field is required.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_short_password(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/api/register/")
            .json(&json!({
                "email": "short@example.com",
                "name": "Short",
                "password": "tiny"
            }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["password"][0], "Ensure this field has at least 8 characters.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_success(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let maintainer = create_test_maintainer(&pool).await;

        let response = app
            .post("/api/login/")
            .json(&json!({
                "username": maintainer.email,
                "password": "testpassword"
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Logged in");
        assert_eq!(body["maintainer_id"], maintainer.id);
        assert_eq!(body["email"], maintainer.email.as_str());
        assert!(!response.cookie("auth_token").value().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_wrong_password(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let maintainer = create_test_maintainer(&pool).await;

        let response = app
            .post("/api/login/")
            .json(&json!({
                "username": maintainer.email,
                "password": "not-the-password"
            }))
            .await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["detail"], "Unable to log in with provided credentials.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_unknown_email(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/api/login/")
            .json(&json!({
                "username": "ghost@example.com",
                "password": "whatever1"
            }))
            .await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["detail"], "Unable to log in with provided credentials.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_logout_without_credentials(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.post("/api/logout/").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Logged out");

        let set_cookie = response.header("set-cookie");
        assert!(set_cookie.to_str().unwrap().contains("Max-Age=0"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_logout_revokes_token(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let maintainer = create_test_maintainer(&pool).await;
        let key = create_test_token(&pool, maintainer.id).await;

        let (name, value) = auth_header(&key);
        app.post("/api/logout/").add_header(name, value).await.assert_status_ok();

        // The revoked token no longer authenticates
        let (name, value) = auth_header(&key);
        let response = app.get("/api/user/").add_header(name, value).await;
        response.assert_status_unauthorized();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_user_info_requires_auth(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.get("/api/user/").await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["detail"], "Authentication credentials were not provided.");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_user_info_via_token_header(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;
        let maintainer = create_test_maintainer(&pool).await;
        let key = create_test_token(&pool, maintainer.id).await;

        let (name, value) = auth_header(&key);
        let response = app.get("/api/user/").add_header(name, value).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["id"], maintainer.id);
        assert_eq!(body["email"], maintainer.email.as_str());
        // Whitelist serialization: no secrets on the wire
        assert!(body.get("password_hash").is_none());
        assert!(body.get("is_admin").is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_session_cookie_round_trip(pool: SqlitePool) {
        // The server saves cookies between requests, like a browser
        let app = create_test_app(pool).await;

        app.post("/api/register/")
            .json(&json!({
                "email": "cookie@example.com",
                "name": "Cookie",
                "password": "longenoughpassword"
            }))
            .await
            .assert_status_ok();

        let response = app.get("/api/user/").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["email"], "cookie@example.com");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_csrf_cookie(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.get("/api/csrf/").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["detail"], "CSRF cookie set");

        let set_cookie = response.header("set-cookie").to_str().unwrap().to_string();
        assert!(set_cookie.starts_with("csrftoken="));
        // Scripts must be able to read it
        assert!(!set_cookie.contains("HttpOnly"));
    }
}
