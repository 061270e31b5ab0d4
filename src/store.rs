//! Persistence seams used by the services.
//!
//! ARCHITECTURE
//! ============
//! Services talk to the database only through these traits so account,
//! session and preference logic can run against the in-memory store in
//! tests. `db::PgStore` is the production implementation.

use async_trait::async_trait;

use crate::models::{
    Committee, Country, CountryId, NewSchool, NewUser, RosterRow, School, SchoolId, User, UserId, UserUpdate,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. duplicate username).
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Users, schools and country preferences.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Insert a user and, when given, the school it owns.
    async fn create_user(&self, user: NewUser, school: Option<NewSchool>) -> Result<(User, Option<School>), StoreError>;

    /// Returns `None` when no user has this id.
    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<Option<User>, StoreError>;

    /// Returns `false` when no user has this id.
    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError>;

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), StoreError>;

    async fn find_school(&self, id: SchoolId) -> Result<Option<School>, StoreError>;

    /// Replace the school's whole preference set. `country_ids` is already
    /// de-duplicated; rank is the 1-based position.
    async fn replace_country_preferences(&self, school_id: SchoolId, country_ids: &[CountryId]) -> Result<(), StoreError>;

    /// Preferences ordered by rank.
    async fn country_preferences(&self, school_id: SchoolId) -> Result<Vec<CountryId>, StoreError>;
}

/// Server-side session rows keyed by an opaque token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, token: &str, user_id: UserId, ttl_hours: i64) -> Result<(), StoreError>;

    /// Resolve an unexpired token to its user id.
    async fn session_user(&self, token: &str) -> Result<Option<UserId>, StoreError>;

    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;

    /// Delete every session of `user_id` except `keep`. Returns the number
    /// of rows removed.
    async fn delete_user_sessions(&self, user_id: UserId, keep: Option<&str>) -> Result<u64, StoreError>;
}

/// Read-only conference data.
#[async_trait]
pub trait ConferenceStore: Send + Sync {
    async fn list_countries(&self) -> Result<Vec<Country>, StoreError>;

    async fn list_committees(&self) -> Result<Vec<Committee>, StoreError>;

    /// Delegates ordered by school name, then delegate name.
    async fn delegate_roster(&self) -> Result<Vec<RosterRow>, StoreError>;
}

/// Everything the HTTP layer needs from one backing store.
pub trait Store: AccountStore + SessionStore + ConferenceStore {}

impl<T> Store for T where T: AccountStore + SessionStore + ConferenceStore {}
