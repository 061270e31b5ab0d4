//! Conference records shared by the store, services and routes.
//!
//! DESIGN
//! ======
//! Rows mirror the Postgres tables one-to-one. `User::password_hash` never
//! leaves the process: it is skipped on serialization and handlers build
//! their own response shapes from these rows.

use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type SchoolId = i64;
pub type CountryId = i64;
pub type CommitteeId = i64;

// =============================================================================
// ENUMS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    Advisor,
    Chair,
}

impl UserType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Advisor => "advisor",
            Self::Chair => "chair",
        }
    }

    #[must_use]
    pub fn from_db(raw: &str) -> Self {
        match raw {
            "chair" => Self::Chair,
            _ => Self::Advisor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    #[default]
    Club,
    Class,
}

impl ProgramType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Club => "club",
            Self::Class => "class",
        }
    }

    #[must_use]
    pub fn from_db(raw: &str) -> Self {
        match raw {
            "class" => Self::Class,
            _ => Self::Club,
        }
    }
}

// =============================================================================
// ACCOUNTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_type: UserType,
    pub is_active: bool,
    pub is_superuser: bool,
    pub school_id: Option<SchoolId>,
}

/// Insert payload for a user; the password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_type: UserType,
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// SCHOOLS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub primary_name: String,
    pub primary_email: String,
    pub primary_phone: String,
    pub program_type: ProgramType,
    pub times_attended: i32,
    pub international: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSchool {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub primary_name: String,
    pub primary_email: String,
    pub primary_phone: String,
    pub program_type: ProgramType,
    pub times_attended: i32,
    pub international: bool,
}

impl NewSchool {
    #[must_use]
    pub fn into_school(self, id: SchoolId) -> School {
        School {
            id,
            name: self.name,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            primary_name: self.primary_name,
            primary_email: self.primary_email,
            primary_phone: self.primary_phone,
            program_type: self.program_type,
            times_attended: self.times_attended,
            international: self.international,
        }
    }
}

// =============================================================================
// CONFERENCE CATALOG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub special: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committee {
    pub id: CommitteeId,
    pub name: String,
    pub full_name: String,
    pub delegation_size: i32,
    pub special: bool,
}

/// One line of the delegate roster export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub delegate: String,
    pub committee: String,
    pub country: String,
    pub school: String,
}
