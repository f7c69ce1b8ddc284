//! Database schema and migrations.
//!
//! Migrations are applied in order; `schema_version` records which ones
//! have run. Statements within a migration are separated by `;`, so the
//! SQL text must not contain semicolons anywhere else.

/// Database migrations (SQLite).
#[cfg(feature = "sqlite")]
pub const MIGRATIONS: &[&str] = &[
    // v1: profiles
    r#"
CREATE TABLE profiles (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name     TEXT NOT NULL,
    country_code  TEXT NOT NULL,
    phone_number  TEXT NOT NULL,
    password      TEXT NOT NULL,             -- Argon2 PHC string
    created_at    TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at    TEXT,
    deleted_at    TEXT                       -- soft delete marker
);

CREATE UNIQUE INDEX idx_profiles_phone_number_active
    ON profiles(phone_number) WHERE deleted_at IS NULL;
"#,
    // v2: per-profile login metadata
    r#"
CREATE TABLE profile_metadata (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_id     INTEGER NOT NULL UNIQUE REFERENCES profiles(id),
    login_attempt  INTEGER NOT NULL DEFAULT 1,
    created_at     TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at     TEXT
);
"#,
];

/// Database migrations (PostgreSQL).
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
pub const MIGRATIONS: &[&str] = &[
    // v1: profiles
    r#"
CREATE TABLE profiles (
    id            BIGSERIAL PRIMARY KEY,
    full_name     TEXT NOT NULL,
    country_code  TEXT NOT NULL,
    phone_number  TEXT NOT NULL,
    password      TEXT NOT NULL,
    created_at    TEXT NOT NULL DEFAULT TO_CHAR(NOW(), 'YYYY-MM-DD HH24:MI:SS'),
    updated_at    TEXT,
    deleted_at    TEXT
);

CREATE UNIQUE INDEX idx_profiles_phone_number_active
    ON profiles(phone_number) WHERE deleted_at IS NULL;
"#,
    // v2: per-profile login metadata
    r#"
CREATE TABLE profile_metadata (
    id             BIGSERIAL PRIMARY KEY,
    profile_id     BIGINT NOT NULL UNIQUE REFERENCES profiles(id),
    login_attempt  BIGINT NOT NULL DEFAULT 1,
    created_at     TEXT NOT NULL DEFAULT TO_CHAR(NOW(), 'YYYY-MM-DD HH24:MI:SS'),
    updated_at     TEXT
);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_profiles_migration() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE profiles"));
        assert!(first.contains("phone_number"));
        assert!(first.contains("deleted_at"));
        assert!(first.contains("WHERE deleted_at IS NULL"));
    }

    #[test]
    fn test_metadata_migration() {
        let second = MIGRATIONS[1];
        assert!(second.contains("CREATE TABLE profile_metadata"));
        assert!(second.contains("profile_id"));
        assert!(second.contains("UNIQUE"));
        assert!(second.contains("login_attempt"));
    }
}
