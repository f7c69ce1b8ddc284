//! Store contract consumed by the profile service.
//!
//! `ProfileRepository` is the sqlx implementation. The service only sees
//! this trait, so tests can swap in stores that fail on purpose.

use async_trait::async_trait;

use crate::db::{NewProfile, Profile, ProfileMetadata, ProfileUpdate};
use crate::Result;

/// Persistence of profiles and their login metadata.
///
/// Every lookup and uniqueness check ignores soft-deleted profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Whether a non-deleted profile uses this local phone number.
    async fn exists_by_phone(&self, phone_number: &str) -> Result<bool>;

    /// Like `exists_by_phone`, ignoring the profile with `exclude_id`.
    async fn exists_by_phone_excluding_id(&self, phone_number: &str, exclude_id: i64)
        -> Result<bool>;

    /// Find a profile by local phone number.
    ///
    /// Fails with `ServiceError::NotFound` when absent or soft-deleted.
    async fn find_by_phone(&self, phone_number: &str) -> Result<Profile>;

    /// Find a profile by ID.
    ///
    /// Fails with `ServiceError::NotFound` when absent or soft-deleted.
    async fn find_by_id(&self, id: i64) -> Result<Profile>;

    /// Insert a profile and return its new ID.
    ///
    /// A duplicate active phone number fails with `ServiceError::Conflict`.
    async fn create(&self, new_profile: &NewProfile) -> Result<i64>;

    /// Apply the fields present in `update`, leaving the others untouched.
    async fn update_partial(&self, id: i64, update: &ProfileUpdate) -> Result<()>;

    /// Increment the login counter, creating it at 1 on first login.
    ///
    /// Returns the row as stored after the increment.
    async fn upsert_login_metadata(&self, profile_id: i64) -> Result<ProfileMetadata>;

    /// Read a profile's login metadata, if any login has been recorded.
    async fn get_login_metadata(&self, profile_id: i64) -> Result<Option<ProfileMetadata>>;
}
