//! Response DTOs for Web API.

use serde::Serialize;

use crate::auth::{LoginResult, ProfileView};

/// Message returned on successful registration.
pub const PROFILE_CREATED_MESSAGE: &str = "Profile is successfully created";

/// Registration response.
#[derive(Debug, Serialize)]
pub struct CreateProfileResponse {
    /// ID of the new profile.
    pub created_id: i64,
    /// Confirmation message.
    pub message: String,
}

impl CreateProfileResponse {
    /// Create a response for a newly registered profile.
    pub fn new(created_id: i64) -> Self {
        Self {
            created_id,
            message: PROFILE_CREATED_MESSAGE.to_string(),
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token (RS256 JWT).
    pub jwt_token: String,
    /// Profile ID.
    pub user_id: i64,
}

impl From<LoginResult> for LoginResponse {
    fn from(result: LoginResult) -> Self {
        Self {
            jwt_token: result.token,
            user_id: result.profile_id,
        }
    }
}

/// Profile response for GET and PUT /profile.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Display name.
    pub full_name: String,
    /// Phone number including the country code.
    pub phone_number: String,
}

impl From<ProfileView> for ProfileResponse {
    fn from(view: ProfileView) -> Self {
        Self {
            full_name: view.full_name,
            phone_number: view.phone_number,
        }
    }
}
