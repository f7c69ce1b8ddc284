//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use profile_service::web::router::create_router;
use profile_service::{AppState, Database, ProfileRepository, TokenService};

/// Signing key used by every test server.
pub const PRIVATE_PEM: &str = include_str!("../fixtures/jwtRS256.key");
/// Public half of [`PRIVATE_PEM`].
pub const PUBLIC_PEM: &str = include_str!("../fixtures/jwtRS256.key.pub");
/// An unrelated key pair.
pub const OTHER_PRIVATE_PEM: &str = include_str!("../fixtures/other.key");
/// Public half of [`OTHER_PRIVATE_PEM`].
pub const OTHER_PUBLIC_PEM: &str = include_str!("../fixtures/other.key.pub");

/// Phone number of the default test profile.
pub const JANE_PHONE: &str = "+628123456789";
/// Password of the default test profile.
pub const JANE_PASSWORD: &str = "Aa1!aaaa";

/// Token service over the test key pair.
pub fn test_tokens() -> TokenService {
    TokenService::from_pem(PRIVATE_PEM.as_bytes(), PUBLIC_PEM.as_bytes(), 3600)
        .expect("Failed to load test keys")
}

/// Create a test server with an in-memory database.
pub async fn create_test_server() -> (TestServer, Database) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let app_state = Arc::new(AppState::new(&db, test_tokens()));
    let router = create_router(app_state, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db)
}

/// Repository over the test database, for inspecting stored state.
pub fn repository(db: &Database) -> ProfileRepository {
    ProfileRepository::new(db.pool().clone())
}

/// Register a profile and return the response body.
pub async fn register(
    server: &TestServer,
    full_name: &str,
    phone_number: &str,
    password: &str,
) -> Value {
    let response = server
        .post("/profile")
        .json(&json!({
            "full_name": full_name,
            "phone_number": phone_number,
            "password": password
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

/// Register the default test profile and return its ID.
pub async fn register_jane(server: &TestServer) -> i64 {
    let body = register(server, "Jane Doe", JANE_PHONE, JANE_PASSWORD).await;
    body["created_id"].as_i64().expect("created_id")
}

/// Log in and return the token.
pub async fn login(server: &TestServer, phone_number: &str, password: &str) -> String {
    let response = server
        .post("/login")
        .json(&json!({
            "phone_number": phone_number,
            "password": password
        }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["jwt_token"]
        .as_str()
        .expect("jwt_token")
        .to_string()
}

/// Value for an Authorization header.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
