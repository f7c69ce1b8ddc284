//! Profile handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::auth::{ProfileService, TokenService};
use crate::db::{ProfileRepository, ProfileStore};
use crate::web::dto::{
    CreateProfileResponse, JsonBody, LoginRequest, LoginResponse, ProfileResponse,
    ProfileUpdateRequest, RegistrationRequest,
};
use crate::web::error::ApiError;
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Profile operations.
    pub service: ProfileService,
}

impl AppState {
    /// Create a new application state over an open database.
    pub fn new(db: &Database, tokens: TokenService) -> Self {
        let store: Arc<dyn ProfileStore> = Arc::new(ProfileRepository::new(db.pool().clone()));
        Self::with_store(store, Arc::new(tokens))
    }

    /// Create a new application state over any profile store.
    pub fn with_store(store: Arc<dyn ProfileStore>, tokens: Arc<TokenService>) -> Self {
        Self {
            service: ProfileService::new(store, tokens),
        }
    }
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// POST /profile - Register a new profile.
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegistrationRequest>,
) -> Result<(StatusCode, Json<CreateProfileResponse>), ApiError> {
    let created_id = state.service.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateProfileResponse::new(created_id)),
    ))
}

/// POST /login - Log in with phone number and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let result = state.service.login(req).await?;
    Ok(Json(LoginResponse::from(result)))
}

/// GET /profile - The caller's own profile.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
    let view = state
        .service
        .get_own_profile(authorization(&headers))
        .await?;
    Ok(Json(ProfileResponse::from(view)))
}

/// PUT /profile - Update the caller's own profile.
///
/// The token is checked before the body is parsed, so an unauthenticated
/// request is 403 whatever its body.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile_id = state.service.authenticate(authorization(&headers))?;
    let JsonBody(req) = JsonBody::<ProfileUpdateRequest>::from_bytes(&body)?;
    let view = state.service.update_profile(profile_id, req).await?;
    Ok(Json(ProfileResponse::from(view)))
}
