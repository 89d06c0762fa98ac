//! Test utilities for integration testing (available with `test-utils` feature).

use crate::auth::password::{self, Argon2Params};
use crate::config::{Config, PasswordConfig, SessionConfig};
use crate::db::handlers::{Maintainers, Repository, Tokens};
use crate::db::models::maintainers::{MaintainerCreateDBRequest, MaintainerDBResponse};
use crate::types::MaintainerId;
use axum::http::{HeaderName, HeaderValue, header};
use axum_test::TestServer;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Password shared by every maintainer from [`create_test_maintainer`].
pub const TEST_PASSWORD: &str = "testpassword";

/// Spin up a [`TestServer`] around the full router on the given pool.
///
/// The server saves cookies between requests, so register/login followed by an
/// authenticated request behaves like a browser session.
pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    let config = create_test_config();
    let state = crate::AppState::builder().db(pool).config(config).build();
    let router = crate::build_router(state).expect("Failed to build router");

    let mut server = TestServer::new(router).expect("Failed to create test server");
    server.save_cookies();
    server
}

pub fn create_test_config() -> Config {
    Config {
        session: SessionConfig {
            // Tests talk plain http
            cookie_secure: false,
            ..Default::default()
        },
        password: PasswordConfig {
            // Cheapest parameters argon2 accepts; hashing strength is not under test
            argon2_memory_kib: 8,
            argon2_iterations: 1,
            argon2_parallelism: 1,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn test_argon2_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

/// Create a maintainer with a unique email and the password [`TEST_PASSWORD`].
pub async fn create_test_maintainer(pool: &SqlitePool) -> MaintainerDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Maintainers::new(&mut conn);

    let tag = Uuid::new_v4().simple().to_string();
    let password_hash =
        password::hash_string_with_params(TEST_PASSWORD, test_argon2_params()).expect("Failed to hash test password");

    repo.create(&MaintainerCreateDBRequest {
        name: format!("Test Maintainer {tag}"),
        email: format!("maintainer_{tag}@example.com"),
        password_hash,
        is_admin: false,
    })
    .await
    .expect("Failed to create test maintainer")
}

/// Mint a token for the maintainer and return its key.
pub async fn create_test_token(pool: &SqlitePool, maintainer_id: MaintainerId) -> String {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Tokens::new(&mut conn);

    repo.get_or_create_for_maintainer(maintainer_id)
        .await
        .expect("Failed to create test token")
        .key
}

/// Header pair for token authentication: `Authorization: Token <key>`.
pub fn auth_header(key: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Token {key}")).expect("token keys are ASCII"),
    )
}
