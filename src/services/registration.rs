//! Signup: create a user, their school and the school's country preferences.
//!
//! DESIGN
//! ======
//! The preference list rides inside the nested school payload but is not a
//! school column, so creation runs in two phases: the list is taken out of
//! the request, the user (and school) are inserted, then the list is linked
//! to the new school and echoed back under `country_preferences`.
//!
//! ERROR HANDLING
//! ==============
//! The user/school insert commits before linking starts. If linking fails
//! the account exists without preferences; the failure is logged with both
//! ids and returned so the client can resubmit preferences.

use serde::Deserialize;

use super::account::AccountError;
use super::{password, preferences};
use crate::models::{CountryId, NewSchool, NewUser, ProgramType, School, User, UserType};
use crate::store::{AccountStore, StoreError};

const MAX_USERNAME_LEN: usize = 150;
const MSG_USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default)]
    pub school: Option<CreateSchoolRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateSchoolRequest {
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
    /// Country ids in preference order.
    pub country_preferences: Vec<CountryId>,
}

impl CreateSchoolRequest {
    /// Split off the preference list, leaving the plain school columns.
    fn into_parts(self) -> (NewSchool, Vec<CountryId>) {
        let school = NewSchool {
            name: self.name.trim().to_owned(),
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code.trim().to_owned(),
            country: self.country,
            primary_name: self.primary_name,
            primary_email: self.primary_email,
            primary_phone: self.primary_phone.trim().to_owned(),
            program_type: self.program_type,
            times_attended: self.times_attended,
            international: self.international,
        };
        (school, self.country_preferences)
    }
}

#[derive(Debug, Clone)]
pub struct CreatedUser {
    pub user: User,
    pub school: Option<School>,
    /// `Some` exactly when a school was created.
    pub country_preferences: Option<Vec<CountryId>>,
}

// =============================================================================
// VALIDATION
// =============================================================================

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

pub(crate) fn validate_username(username: &str) -> Result<(), AccountError> {
    if username.is_empty() {
        return Err(AccountError::Validation("Username is required.".into()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AccountError::Validation(format!(
            "Username may be at most {MAX_USERNAME_LEN} characters."
        )));
    }
    if !username.chars().all(is_username_char) {
        return Err(AccountError::Validation(
            "Username may contain only letters, digits and @/./+/-/_ characters.".into(),
        ));
    }
    Ok(())
}

/// Digits, spaces and dashes.
pub(crate) fn is_valid_zip(zip: &str) -> bool {
    zip.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
}

/// `(ddd) ddd-dddd` with optional parentheses and an optional ` xNNNNN`
/// extension.
pub(crate) fn is_valid_us_phone(phone: &str) -> bool {
    let mut rest = phone;

    rest = rest.strip_prefix('(').unwrap_or(rest);
    let Some(after_area) = take_digits(rest, 3) else {
        return false;
    };
    rest = after_area.strip_prefix(')').unwrap_or(after_area);

    let Some(after_space) = take_whitespace(rest) else {
        return false;
    };
    let Some(after_exchange) = take_digits(after_space, 3) else {
        return false;
    };
    let Some(after_dash) = after_exchange.strip_prefix('-') else {
        return false;
    };
    let Some(after_line) = take_digits(after_dash, 4) else {
        return false;
    };
    if after_line.is_empty() {
        return true;
    }

    let Some(ext) = take_whitespace(after_line).and_then(|r| r.strip_prefix(['x', 'X'])) else {
        return false;
    };
    (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_digit())
}

/// Digits plus `- x + ( )` and spaces.
pub(crate) fn is_valid_international_phone(phone: &str) -> bool {
    !phone.is_empty()
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | 'x' | 'X' | '+' | '(' | ')') || c.is_whitespace())
}

fn take_digits(s: &str, count: usize) -> Option<&str> {
    let head = s.get(..count)?;
    head.chars().all(|c| c.is_ascii_digit()).then(|| &s[count..])
}

fn take_whitespace(s: &str) -> Option<&str> {
    let mut chars = s.chars();
    chars.next().filter(|c| c.is_whitespace())?;
    Some(chars.as_str())
}

fn validate_school(school: &NewSchool) -> Result<(), AccountError> {
    if school.name.is_empty() {
        return Err(AccountError::Validation("School name is required.".into()));
    }
    if !is_valid_zip(&school.zip_code) {
        return Err(AccountError::Validation(
            "Zip codes may only contain numbers, spaces, and dashes.".into(),
        ));
    }
    if !school.primary_phone.is_empty() {
        let valid = if school.international {
            is_valid_international_phone(&school.primary_phone)
        } else {
            is_valid_us_phone(&school.primary_phone)
        };
        if !valid {
            return Err(AccountError::Validation("Please enter a valid phone number.".into()));
        }
    }
    if school.times_attended < 0 {
        return Err(AccountError::Validation("Times attended must be a positive number.".into()));
    }
    Ok(())
}

// =============================================================================
// CREATE
// =============================================================================

/// Create a user with an optional nested school and link the school's
/// country preferences.
///
/// # Errors
///
/// `Validation` for malformed input or a taken username; `Store` if a write
/// fails.
pub async fn create_user(store: &dyn AccountStore, request: CreateUserRequest) -> Result<CreatedUser, AccountError> {
    validate_username(&request.username)?;
    if request.password.is_empty() {
        return Err(AccountError::Validation("Password is required.".into()));
    }

    // Phase 1: take the preference list out of the nested school.
    let (school, country_ids) = match request.school {
        Some(school) => {
            let (school, country_ids) = school.into_parts();
            validate_school(&school)?;
            (Some(school), country_ids)
        }
        None => (None, Vec::new()),
    };

    if store
        .find_user_by_username(&request.username)
        .await?
        .is_some()
    {
        return Err(AccountError::Validation(MSG_USERNAME_TAKEN.into()));
    }

    let new_user = NewUser {
        username: request.username,
        password_hash: password::hash_password(&request.password)?,
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email.trim().to_owned(),
        user_type: request.user_type,
    };

    // Phase 2: standard create.
    let (user, school) = store
        .create_user(new_user, school)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => AccountError::Validation(MSG_USERNAME_TAKEN.into()),
            other => AccountError::Store(other),
        })?;
    tracing::info!(user_id = user.id, school_id = ?school.as_ref().map(|s| s.id), "user created");

    // Phase 3: link preferences to the new school.
    let country_preferences = match &school {
        Some(school) => {
            let linked = preferences::link_country_preferences(store, school.id, &country_ids)
                .await
                .inspect_err(|e| {
                    tracing::error!(user_id = user.id, school_id = school.id, error = %e, "country preference linking failed");
                })?;
            Some(linked)
        }
        None => None,
    };

    Ok(CreatedUser { user, school, country_preferences })
}

#[cfg(test)]
#[path = "registration_test.rs"]
mod tests;
