//! Authentication and profile management.
//!
//! This module provides password hashing, field validation, session
//! tokens, and the profile service built on top of them.

mod password;
pub mod profile;
pub mod token;
pub mod validation;

pub use password::{hash_password, verify_password, PasswordError};
pub use profile::{
    LoginRequest, LoginResult, ProfileError, ProfileService, ProfileUpdateRequest, ProfileView,
    RegistrationRequest,
};
pub use token::{extract_bearer, Claims, TokenError, TokenService};
