//! Profile models.

/// Profile entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    /// Store-assigned ID, immutable once created.
    pub id: i64,
    /// Display name.
    pub full_name: String,
    /// Dialing prefix, e.g. `+62`.
    pub country_code: String,
    /// Local number without the country code.
    pub phone_number: String,
    /// Password hash (Argon2 PHC string).
    pub password: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last mutation timestamp.
    pub updated_at: Option<String>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<String>,
}

impl Profile {
    /// Full phone number including the country code.
    pub fn full_phone_number(&self) -> String {
        format!("{}{}", self.country_code, self.phone_number)
    }

    /// Whether the profile has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Data for creating a new profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    /// Display name.
    pub full_name: String,
    /// Dialing prefix.
    pub country_code: String,
    /// Local number without the country code.
    pub phone_number: String,
    /// Password hash (must already be hashed).
    pub password: String,
}

impl NewProfile {
    /// Create a new profile record.
    pub fn new(
        full_name: impl Into<String>,
        country_code: impl Into<String>,
        phone_number: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            country_code: country_code.into(),
            phone_number: phone_number.into(),
            password: password.into(),
        }
    }
}

/// Partial update of a profile. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub full_name: Option<String>,
    /// New local number (without the country code).
    pub phone_number: Option<String>,
}

impl ProfileUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a new display name.
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Set a new local phone number.
    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Check whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone_number.is_none()
    }
}

/// Login bookkeeping for a profile.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileMetadata {
    /// Row ID.
    pub id: i64,
    /// Owning profile.
    pub profile_id: i64,
    /// Number of successful logins.
    pub login_attempt: i64,
    /// Creation timestamp (first login).
    pub created_at: String,
    /// Timestamp of the latest increment.
    pub updated_at: Option<String>,
}
