//! Phone-number profile service.
//!
//! Registration, login with RS256 session tokens, and self-service profile
//! reads and updates over a small REST API.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    extract_bearer, hash_password, verify_password, Claims, LoginRequest, LoginResult,
    PasswordError, ProfileError, ProfileService, ProfileUpdateRequest, ProfileView,
    RegistrationRequest, TokenError, TokenService,
};
pub use config::Config;
pub use db::{
    Database, NewProfile, Profile, ProfileMetadata, ProfileRepository, ProfileStore,
    ProfileUpdate,
};
pub use error::{Result, ServiceError};
pub use web::{ApiError, AppState, WebServer};
