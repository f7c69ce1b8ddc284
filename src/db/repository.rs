//! Profile repository.
//!
//! sqlx implementation of [`ProfileStore`]. All values are bound as
//! parameters, including the dynamically assembled partial update.

use async_trait::async_trait;
use sqlx::QueryBuilder;

use super::profile::{NewProfile, Profile, ProfileMetadata, ProfileUpdate};
use super::{DbBackend, DbPool, ProfileStore, SQL_NOW};
use crate::{Result, ServiceError};

const PROFILE_COLUMNS: &str =
    "id, full_name, country_code, phone_number, password, created_at, updated_at, deleted_at";

/// Repository for profile and login metadata rows.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: DbPool,
}

impl ProfileRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch_active(&self, column: &str, value: ProfileKey<'_>) -> Result<Option<Profile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE {column} = $1 AND deleted_at IS NULL"
        );
        let query = sqlx::query_as::<_, Profile>(&sql);
        let query = match value {
            ProfileKey::Id(id) => query.bind(id),
            ProfileKey::Phone(phone) => query.bind(phone),
        };
        Ok(query.fetch_optional(&self.pool).await?)
    }
}

enum ProfileKey<'a> {
    Id(i64),
    Phone(&'a str),
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn exists_by_phone(&self, phone_number: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE phone_number = $1 AND deleted_at IS NULL)",
        )
        .bind(phone_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn exists_by_phone_excluding_id(
        &self,
        phone_number: &str,
        exclude_id: i64,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM profiles
                           WHERE phone_number = $1 AND id <> $2 AND deleted_at IS NULL)",
        )
        .bind(phone_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Profile> {
        self.fetch_active("phone_number", ProfileKey::Phone(phone_number))
            .await?
            .ok_or_else(|| ServiceError::NotFound("profile".to_string()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Profile> {
        self.fetch_active("id", ProfileKey::Id(id))
            .await?
            .ok_or_else(|| ServiceError::NotFound("profile".to_string()))
    }

    async fn create(&self, new_profile: &NewProfile) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO profiles (full_name, country_code, phone_number, password)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&new_profile.full_name)
        .bind(&new_profile.country_code)
        .bind(&new_profile.phone_number)
        .bind(&new_profile.password)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_partial(&self, id: i64, update: &ProfileUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }

        let mut query: QueryBuilder<DbBackend> = QueryBuilder::new("UPDATE profiles SET ");
        let mut separated = query.separated(", ");

        if let Some(ref full_name) = update.full_name {
            separated.push("full_name = ");
            separated.push_bind_unseparated(full_name);
        }
        if let Some(ref phone_number) = update.phone_number {
            separated.push("phone_number = ");
            separated.push_bind_unseparated(phone_number);
        }
        separated.push(format!("updated_at = {SQL_NOW}"));

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" AND deleted_at IS NULL");

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("profile".to_string()));
        }
        Ok(())
    }

    async fn upsert_login_metadata(&self, profile_id: i64) -> Result<ProfileMetadata> {
        let sql = format!(
            "INSERT INTO profile_metadata (profile_id, login_attempt, updated_at)
             VALUES ($1, 1, {SQL_NOW})
             ON CONFLICT (profile_id) DO UPDATE
                 SET login_attempt = profile_metadata.login_attempt + 1,
                     updated_at = {SQL_NOW}
             RETURNING id, profile_id, login_attempt, created_at, updated_at"
        );
        let metadata = sqlx::query_as::<_, ProfileMetadata>(&sql)
            .bind(profile_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(metadata)
    }

    async fn get_login_metadata(&self, profile_id: i64) -> Result<Option<ProfileMetadata>> {
        let metadata = sqlx::query_as::<_, ProfileMetadata>(
            "SELECT id, profile_id, login_attempt, created_at, updated_at
             FROM profile_metadata WHERE profile_id = $1",
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(metadata)
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup() -> (Database, ProfileRepository) {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ProfileRepository::new(db.pool().clone());
        (db, repo)
    }

    async fn soft_delete(db: &Database, id: i64) {
        sqlx::query("UPDATE profiles SET deleted_at = datetime('now') WHERE id = $1")
            .bind(id)
            .execute(db.pool())
            .await
            .unwrap();
    }

    fn jane() -> NewProfile {
        NewProfile::new("Jane Doe", "+62", "81234567890", "hashedpw")
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let (_db, repo) = setup().await;

        let id = repo.create(&jane()).await.unwrap();
        assert!(id > 0);

        let profile = repo.find_by_id(id).await.unwrap();
        assert_eq!(profile.id, id);
        assert_eq!(profile.full_name, "Jane Doe");
        assert_eq!(profile.country_code, "+62");
        assert_eq!(profile.phone_number, "81234567890");
        assert_eq!(profile.password, "hashedpw");
        assert!(profile.updated_at.is_none());
        assert!(profile.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_find_by_phone() {
        let (_db, repo) = setup().await;
        let id = repo.create(&jane()).await.unwrap();

        let profile = repo.find_by_phone("81234567890").await.unwrap();
        assert_eq!(profile.id, id);

        let missing = repo.find_by_phone("80000000000").await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        let (_db, repo) = setup().await;
        assert!(matches!(repo.find_by_id(999).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_exists_by_phone() {
        let (_db, repo) = setup().await;
        assert!(!repo.exists_by_phone("81234567890").await.unwrap());

        repo.create(&jane()).await.unwrap();
        assert!(repo.exists_by_phone("81234567890").await.unwrap());
        assert!(!repo.exists_by_phone("81234567891").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_by_phone_excluding_id() {
        let (_db, repo) = setup().await;
        let id = repo.create(&jane()).await.unwrap();

        assert!(!repo.exists_by_phone_excluding_id("81234567890", id).await.unwrap());
        assert!(repo.exists_by_phone_excluding_id("81234567890", id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_conflict() {
        let (_db, repo) = setup().await;
        repo.create(&jane()).await.unwrap();

        let duplicate = NewProfile::new("John Roe", "+62", "81234567890", "otherpw");
        let result = repo.create(&duplicate).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_soft_deleted_profile_is_invisible() {
        let (db, repo) = setup().await;
        let id = repo.create(&jane()).await.unwrap();
        soft_delete(&db, id).await;

        assert!(!repo.exists_by_phone("81234567890").await.unwrap());
        assert!(matches!(repo.find_by_id(id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            repo.find_by_phone("81234567890").await,
            Err(ServiceError::NotFound(_))
        ));

        // The number is free again once its previous owner is soft-deleted
        let new_id = repo.create(&jane()).await.unwrap();
        assert_ne!(new_id, id);
    }

    #[tokio::test]
    async fn test_update_full_name_only() {
        let (_db, repo) = setup().await;
        let id = repo.create(&jane()).await.unwrap();

        repo.update_partial(id, &ProfileUpdate::new().full_name("Jane Smith"))
            .await
            .unwrap();

        let profile = repo.find_by_id(id).await.unwrap();
        assert_eq!(profile.full_name, "Jane Smith");
        assert_eq!(profile.phone_number, "81234567890");
        assert!(profile.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_phone_only() {
        let (_db, repo) = setup().await;
        let id = repo.create(&jane()).await.unwrap();

        repo.update_partial(id, &ProfileUpdate::new().phone_number("8999999999"))
            .await
            .unwrap();

        let profile = repo.find_by_id(id).await.unwrap();
        assert_eq!(profile.full_name, "Jane Doe");
        assert_eq!(profile.phone_number, "8999999999");
    }

    #[tokio::test]
    async fn test_update_binds_values_verbatim() {
        let (_db, repo) = setup().await;
        let id = repo.create(&jane()).await.unwrap();

        let tricky = "O'Brien'); DROP TABLE profiles; --";
        repo.update_partial(id, &ProfileUpdate::new().full_name(tricky))
            .await
            .unwrap();

        let profile = repo.find_by_id(id).await.unwrap();
        assert_eq!(profile.full_name, tricky);
    }

    #[tokio::test]
    async fn test_update_empty_is_noop() {
        let (_db, repo) = setup().await;
        let id = repo.create(&jane()).await.unwrap();

        repo.update_partial(id, &ProfileUpdate::new()).await.unwrap();

        let profile = repo.find_by_id(id).await.unwrap();
        assert!(profile.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_profile() {
        let (_db, repo) = setup().await;
        let result = repo
            .update_partial(42, &ProfileUpdate::new().full_name("Nobody"))
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_to_taken_phone_is_conflict() {
        let (_db, repo) = setup().await;
        repo.create(&jane()).await.unwrap();
        let other = repo
            .create(&NewProfile::new("John Roe", "+62", "8111111111", "pw"))
            .await
            .unwrap();

        let result = repo
            .update_partial(other, &ProfileUpdate::new().phone_number("81234567890"))
            .await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_upsert_login_metadata_increments() {
        let (_db, repo) = setup().await;
        let id = repo.create(&jane()).await.unwrap();
        assert!(repo.get_login_metadata(id).await.unwrap().is_none());

        let first = repo.upsert_login_metadata(id).await.unwrap();
        assert_eq!(first.profile_id, id);
        assert_eq!(first.login_attempt, 1);
        let metadata = repo.get_login_metadata(id).await.unwrap().unwrap();
        assert_eq!(metadata.login_attempt, 1);
        assert!(metadata.updated_at.is_some());

        let second = repo.upsert_login_metadata(id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.login_attempt, 2);
        let metadata = repo.get_login_metadata(id).await.unwrap().unwrap();
        assert_eq!(metadata.login_attempt, 2);
    }

    #[tokio::test]
    async fn test_upsert_login_metadata_is_per_profile() {
        let (_db, repo) = setup().await;
        let a = repo.create(&jane()).await.unwrap();
        let b = repo
            .create(&NewProfile::new("John Roe", "+62", "8111111111", "pw"))
            .await
            .unwrap();

        repo.upsert_login_metadata(a).await.unwrap();
        repo.upsert_login_metadata(a).await.unwrap();
        repo.upsert_login_metadata(b).await.unwrap();

        assert_eq!(repo.get_login_metadata(a).await.unwrap().unwrap().login_attempt, 2);
        assert_eq!(repo.get_login_metadata(b).await.unwrap().unwrap().login_attempt, 1);
    }
}
