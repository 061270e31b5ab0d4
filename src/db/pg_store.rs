//! Postgres implementation of the store traits.
//!
//! TRADE-OFFS
//! ==========
//! `create_user` runs the school and user inserts in one transaction so a
//! school never exists without its owner. Preference replacement is its own
//! transaction (delete + insert) and is invoked by the registration service
//! after the user commit.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::{
    Committee, Country, CountryId, NewSchool, NewUser, ProgramType, RosterRow, School, SchoolId, User, UserId,
    UserType, UserUpdate,
};
use crate::store::{AccountStore, ConferenceStore, SessionStore, StoreError};

const USER_COLUMNS: &str =
    "id, username, password_hash, first_name, last_name, email, user_type, is_active, is_superuser, school_id";

const SCHOOL_COLUMNS: &str = "id, name, address, city, state, zip_code, country, primary_name, primary_email, \
                              primary_phone, program_type, times_attended, international";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    let user_type: String = row.get("user_type");
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        user_type: UserType::from_db(&user_type),
        is_active: row.get("is_active"),
        is_superuser: row.get("is_superuser"),
        school_id: row.get("school_id"),
    }
}

fn school_from_row(row: &PgRow) -> School {
    let program_type: String = row.get("program_type");
    School {
        id: row.get("id"),
        name: row.get("name"),
        address: row.get("address"),
        city: row.get("city"),
        state: row.get("state"),
        zip_code: row.get("zip_code"),
        country: row.get("country"),
        primary_name: row.get("primary_name"),
        primary_email: row.get("primary_email"),
        primary_phone: row.get("primary_phone"),
        program_type: ProgramType::from_db(&program_type),
        times_attended: row.get("times_attended"),
        international: row.get("international"),
    }
}

/// Map unique-constraint failures to `Conflict`, everything else to `Database`.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(db_err.message().to_owned());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl AccountStore for PgStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_user(&self, user: NewUser, school: Option<NewSchool>) -> Result<(User, Option<School>), StoreError> {
        let mut tx = self.pool.begin().await?;

        let school = match school {
            Some(new_school) => {
                let row = sqlx::query(
                    r"INSERT INTO schools
                          (name, address, city, state, zip_code, country, primary_name,
                           primary_email, primary_phone, program_type, times_attended, international)
                      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                      RETURNING id",
                )
                .bind(&new_school.name)
                .bind(&new_school.address)
                .bind(&new_school.city)
                .bind(&new_school.state)
                .bind(&new_school.zip_code)
                .bind(&new_school.country)
                .bind(&new_school.primary_name)
                .bind(&new_school.primary_email)
                .bind(&new_school.primary_phone)
                .bind(new_school.program_type.as_str())
                .bind(new_school.times_attended)
                .bind(new_school.international)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_write_error)?;
                Some(new_school.into_school(row.get("id")))
            }
            None => None,
        };

        let row = sqlx::query(&format!(
            r"INSERT INTO users (username, password_hash, first_name, last_name, email, user_type, school_id)
              VALUES ($1, $2, $3, $4, $5, $6, $7)
              RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.user_type.as_str())
        .bind(school.as_ref().map(|s| s.id))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;
        Ok((user_from_row(&row), school))
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            r"UPDATE users
              SET first_name = COALESCE($2, first_name),
                  last_name = COALESCE($3, last_name),
                  email = COALESCE($4, email)
              WHERE id = $1
              RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_school(&self, id: SchoolId) -> Result<Option<School>, StoreError> {
        let row = sqlx::query(&format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(school_from_row))
    }

    async fn replace_country_preferences(&self, school_id: SchoolId, country_ids: &[CountryId]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM country_preferences WHERE school_id = $1")
            .bind(school_id)
            .execute(&mut *tx)
            .await?;

        for (rank, country_id) in (1_i32..).zip(country_ids) {
            sqlx::query("INSERT INTO country_preferences (school_id, country_id, rank) VALUES ($1, $2, $3)")
                .bind(school_id)
                .bind(country_id)
                .bind(rank)
                .execute(&mut *tx)
                .await
                .map_err(map_write_error)?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn country_preferences(&self, school_id: SchoolId) -> Result<Vec<CountryId>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT country_id FROM country_preferences WHERE school_id = $1 ORDER BY rank",
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_session(&self, token: &str, user_id: UserId, ttl_hours: i64) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at)
             VALUES ($1, $2, now() + ($3::bigint * interval '1 hour'))",
        )
        .bind(token)
        .bind(user_id)
        .bind(ttl_hours)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn session_user(&self, token: &str) -> Result<Option<UserId>, StoreError> {
        let user_id = sqlx::query_scalar::<_, i64>(
            r"SELECT s.user_id
              FROM sessions s
              JOIN users u ON u.id = s.user_id
              WHERE s.token = $1 AND s.expires_at > now() AND u.is_active",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id)
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: UserId, keep: Option<&str>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND ($2::text IS NULL OR token <> $2)")
            .bind(user_id)
            .bind(keep)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ConferenceStore for PgStore {
    async fn list_countries(&self) -> Result<Vec<Country>, StoreError> {
        let rows = sqlx::query("SELECT id, name, special FROM countries ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|r| Country { id: r.get("id"), name: r.get("name"), special: r.get("special") })
            .collect())
    }

    async fn list_committees(&self) -> Result<Vec<Committee>, StoreError> {
        let rows =
            sqlx::query("SELECT id, name, full_name, delegation_size, special FROM committees ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .iter()
            .map(|r| Committee {
                id: r.get("id"),
                name: r.get("name"),
                full_name: r.get("full_name"),
                delegation_size: r.get("delegation_size"),
                special: r.get("special"),
            })
            .collect())
    }

    async fn delegate_roster(&self) -> Result<Vec<RosterRow>, StoreError> {
        // Delegates without a slot still appear, with blank assignment columns.
        let rows = sqlx::query(
            r"SELECT d.name AS delegate,
                     COALESCE(cm.name, '') AS committee,
                     COALESCE(co.name, '') AS country,
                     COALESCE(s.name, '') AS school
              FROM delegates d
              LEFT JOIN delegate_slots ds ON ds.id = d.delegate_slot_id
              LEFT JOIN assignments a ON a.id = ds.assignment_id
              LEFT JOIN committees cm ON cm.id = a.committee_id
              LEFT JOIN countries co ON co.id = a.country_id
              LEFT JOIN schools s ON s.id = a.school_id
              ORDER BY s.name NULLS FIRST, d.name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| RosterRow {
                delegate: r.get("delegate"),
                committee: r.get("committee"),
                country: r.get("country"),
                school: r.get("school"),
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "pg_store_test.rs"]
mod tests;
