//! Profile service.
//!
//! Registration, login, and reading or updating the caller's own profile.
//! The service sits between the HTTP handlers and the [`ProfileStore`]; it
//! owns validation, password hashing, and token handling.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};
use validator::Validate;

use crate::auth::token::{extract_bearer, TokenService};
use crate::auth::validation::{
    field_messages, split_phone_number, COUNTRY_CODE, MAX_FULL_NAME_LENGTH, MAX_PASSWORD_LENGTH,
    MAX_PHONE_LENGTH, MIN_FULL_NAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_PHONE_LENGTH,
};
use crate::auth::{hash_password, verify_password};
use crate::db::{NewProfile, Profile, ProfileStore, ProfileUpdate};
use crate::ServiceError;

/// Profile service errors.
///
/// The `Display` text of each variant is what API callers see.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// One or more fields failed validation.
    #[error("Validation failed")]
    Validation(HashMap<String, Vec<String>>),

    /// Update request carried no field.
    #[error("full_name or phone_number should be filled")]
    NothingToUpdate,

    /// Another active profile already uses the phone number.
    #[error("Phone Number Already Exist")]
    PhoneNumberExists,

    /// No active profile for the phone number, or wrong country code.
    #[error("Account not found")]
    AccountNotFound,

    /// Password did not verify.
    #[error("Password doesn't match")]
    PasswordMismatch,

    /// Missing, malformed, expired or forged token.
    #[error("Invalid Token")]
    InvalidToken,

    /// Token is valid but its profile no longer exists.
    #[error("Profile not found")]
    ProfileNotFound,

    /// Store, hashing or signing failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for ProfileError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ProfileError::Validation(field_messages(&errors))
    }
}

fn internal(err: impl std::fmt::Display) -> ProfileError {
    ProfileError::Internal(err.to_string())
}

fn missing_country_code() -> ProfileError {
    ProfileError::Validation(HashMap::from([(
        "phone_number".to_string(),
        vec![format!("phone_number must start with {COUNTRY_CODE}")],
    )]))
}

/// Registration request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistrationRequest {
    /// Display name.
    #[validate(length(
        min = MIN_FULL_NAME_LENGTH,
        max = MAX_FULL_NAME_LENGTH,
        message = "full_name must be 3 to 60 characters"
    ))]
    pub full_name: String,
    /// Phone number including the `+62` prefix.
    #[validate(
        length(
            min = MIN_PHONE_LENGTH,
            max = MAX_PHONE_LENGTH,
            message = "phone_number must be 10 to 13 characters"
        ),
        custom(function = "crate::auth::validation::phone_with_country_code")
    )]
    pub phone_number: String,
    /// Plaintext password.
    #[validate(
        length(
            min = MIN_PASSWORD_LENGTH,
            max = MAX_PASSWORD_LENGTH,
            message = "password must be 6 to 64 characters"
        ),
        custom(function = "crate::auth::validation::strong_password")
    )]
    pub password: String,
}

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Phone number including the `+62` prefix.
    pub phone_number: String,
    /// Plaintext password.
    pub password: String,
}

/// Update request. Absent fields are left unchanged; present ones are
/// validated, so an empty string is rejected rather than ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    /// New display name.
    #[serde(default)]
    #[validate(length(
        min = MIN_FULL_NAME_LENGTH,
        max = MAX_FULL_NAME_LENGTH,
        message = "full_name must be 3 to 60 characters"
    ))]
    pub full_name: Option<String>,
    /// New phone number including the `+62` prefix.
    #[serde(default)]
    #[validate(
        length(
            min = MIN_PHONE_LENGTH,
            max = MAX_PHONE_LENGTH,
            message = "phone_number must be 10 to 13 characters"
        ),
        custom(function = "crate::auth::validation::phone_with_country_code")
    )]
    pub phone_number: Option<String>,
}

impl ProfileUpdateRequest {
    /// Whether no field would change.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone_number.is_none()
    }
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Signed session token.
    pub token: String,
    /// Profile ID.
    pub profile_id: i64,
}

/// What a caller sees of their own profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    /// Display name.
    pub full_name: String,
    /// Phone number including the country code.
    pub phone_number: String,
}

impl From<Profile> for ProfileView {
    fn from(profile: Profile) -> Self {
        Self {
            phone_number: profile.full_phone_number(),
            full_name: profile.full_name,
        }
    }
}

/// Profile operations over a store and a token service.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    tokens: Arc<TokenService>,
}

impl ProfileService {
    /// Create a new service.
    pub fn new(store: Arc<dyn ProfileStore>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Register a new profile and return its ID.
    pub async fn register(&self, request: RegistrationRequest) -> Result<i64, ProfileError> {
        request.validate()?;

        let (country_code, phone_number) =
            split_phone_number(&request.phone_number).ok_or_else(missing_country_code)?;

        if self
            .store
            .exists_by_phone(phone_number)
            .await
            .map_err(internal)?
        {
            return Err(ProfileError::PhoneNumberExists);
        }

        let password_hash = hash_password(&request.password).map_err(internal)?;
        let new_profile = NewProfile::new(
            request.full_name,
            country_code,
            phone_number,
            password_hash,
        );

        let profile_id = self
            .store
            .create(&new_profile)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration.
                ServiceError::Conflict(_) => ProfileError::PhoneNumberExists,
                other => internal(other),
            })?;

        info!(profile_id, "profile registered");
        Ok(profile_id)
    }

    /// Log in with phone number and password.
    ///
    /// Every successful login increments the profile's login counter; the
    /// login fails if the counter cannot be recorded.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResult, ProfileError> {
        let (_, phone_number) =
            split_phone_number(&request.phone_number).ok_or(ProfileError::AccountNotFound)?;

        let profile = match self.store.find_by_phone(phone_number).await {
            Ok(profile) => profile,
            Err(ServiceError::NotFound(_)) => return Err(ProfileError::AccountNotFound),
            Err(e) => return Err(internal(e)),
        };

        if !verify_password(&profile.password, &request.password) {
            warn!(profile_id = profile.id, "login rejected: password mismatch");
            return Err(ProfileError::PasswordMismatch);
        }

        let token = self.tokens.issue_token(profile.id).map_err(internal)?;

        let metadata = self
            .store
            .upsert_login_metadata(profile.id)
            .await
            .map_err(internal)?;
        info!(
            profile_id = profile.id,
            login_attempt = metadata.login_attempt,
            "login succeeded"
        );

        Ok(LoginResult {
            token,
            profile_id: profile.id,
        })
    }

    /// Resolve the caller's profile ID from an Authorization header value.
    pub fn authenticate(&self, auth_header: Option<&str>) -> Result<i64, ProfileError> {
        let token = extract_bearer(auth_header).map_err(|e| {
            tracing::debug!(reason = %e, "authorization header rejected");
            ProfileError::InvalidToken
        })?;
        self.tokens
            .verify_token(token)
            .ok_or(ProfileError::InvalidToken)
    }

    /// Read the caller's own profile.
    pub async fn get_own_profile(
        &self,
        auth_header: Option<&str>,
    ) -> Result<ProfileView, ProfileError> {
        let profile_id = self.authenticate(auth_header)?;
        self.fetch_view(profile_id).await
    }

    /// Update the caller's own profile and return the result.
    pub async fn update_own_profile(
        &self,
        auth_header: Option<&str>,
        request: ProfileUpdateRequest,
    ) -> Result<ProfileView, ProfileError> {
        let profile_id = self.authenticate(auth_header)?;
        self.update_profile(profile_id, request).await
    }

    /// Update an already authenticated profile and return the result.
    pub async fn update_profile(
        &self,
        profile_id: i64,
        request: ProfileUpdateRequest,
    ) -> Result<ProfileView, ProfileError> {
        if request.is_empty() {
            return Err(ProfileError::NothingToUpdate);
        }
        request.validate()?;

        let mut update = ProfileUpdate::new();
        if let Some(full_name) = request.full_name {
            update = update.full_name(full_name);
        }
        if let Some(ref phone_with_prefix) = request.phone_number {
            let (_, phone_number) =
                split_phone_number(phone_with_prefix).ok_or_else(missing_country_code)?;
            if self
                .store
                .exists_by_phone_excluding_id(phone_number, profile_id)
                .await
                .map_err(internal)?
            {
                return Err(ProfileError::PhoneNumberExists);
            }
            update = update.phone_number(phone_number);
        }

        self.store
            .update_partial(profile_id, &update)
            .await
            .map_err(|e| match e {
                ServiceError::Conflict(_) => ProfileError::PhoneNumberExists,
                ServiceError::NotFound(_) => ProfileError::ProfileNotFound,
                other => internal(other),
            })?;

        info!(profile_id, "profile updated");
        self.fetch_view(profile_id).await
    }

    async fn fetch_view(&self, profile_id: i64) -> Result<ProfileView, ProfileError> {
        match self.store.find_by_id(profile_id).await {
            Ok(profile) => Ok(ProfileView::from(profile)),
            Err(ServiceError::NotFound(_)) => Err(ProfileError::ProfileNotFound),
            Err(e) => {
                error!(profile_id, error = %e, "failed to load profile");
                Err(internal(e))
            }
        }
    }
}
