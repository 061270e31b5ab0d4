//! Account service: authentication, password lifecycle and user access.
//!
//! DESIGN
//! ======
//! Every operation returns `Result<_, AccountError>`; the routes translate
//! variants to HTTP statuses in one place. Operations that depend on who is
//! asking take the request's `SessionContext` explicitly.
//!
//! ERROR HANDLING
//! ==============
//! Authentication failures never reveal whether the username exists: both
//! cases return the same message and both pay for one hash verification.

use std::sync::{Arc, LazyLock};

use tokio::task::JoinHandle;

use super::mailer::{self, Mailer};
use super::password::{self, HashError};
use super::session::{self, SessionContext};
use crate::models::{User, UserId, UserUpdate};
use crate::store::{AccountStore, SessionStore, StoreError};

pub const MSG_MISSING_FIELDS: &str = "Please fill in all fields.";
pub const MSG_INVALID_CREDENTIALS: &str = "Incorrect username or password.";
pub const MSG_INACTIVE_ACCOUNT: &str = "Your account is inactive.";
pub const MSG_ALREADY_LOGGED_IN: &str = "Another user is currently logged in.";
pub const MSG_EMPTY_NEW_PASSWORD: &str = "The new password must be nonempty.";
pub const MSG_INCORRECT_PASSWORD: &str = "Incorrect password.";

/// Verified against when the username is unknown, so both failure paths cost
/// the same.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| password::hash_password("huxley-timing-equalizer").unwrap_or_default());

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Authentication(&'static str),
    #[error("{0}")]
    PasswordChangeFailed(&'static str),
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    PermissionDenied(&'static str),
    #[error("authentication credentials were not provided")]
    Unauthenticated,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    PasswordHash(#[from] HashError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Look up `username` and check `password` against its stored hash.
///
/// # Errors
///
/// `Authentication` for blank input, bad credentials or inactive accounts;
/// `Store` if the lookup fails.
pub async fn authenticate(store: &dyn AccountStore, username: &str, password: &str) -> Result<User, AccountError> {
    if username.is_empty() || password.is_empty() {
        return Err(AccountError::Authentication(MSG_MISSING_FIELDS));
    }

    let Some(user) = store.find_user_by_username(username).await? else {
        let _ = password::verify_password(password, &DUMMY_HASH);
        return Err(AccountError::Authentication(MSG_INVALID_CREDENTIALS));
    };

    if !password::verify_password(password, &user.password_hash) {
        return Err(AccountError::Authentication(MSG_INVALID_CREDENTIALS));
    }
    if !user.is_active {
        return Err(AccountError::Authentication(MSG_INACTIVE_ACCOUNT));
    }

    Ok(user)
}

/// Log a user in on an anonymous session.
///
/// Returns the user and the new session token.
///
/// # Errors
///
/// `PermissionDenied` if the session is already authenticated (checked before
/// the credentials are looked at); otherwise as [`authenticate`].
pub async fn log_in(
    store: &dyn AccountStore,
    sessions: &dyn SessionStore,
    ctx: &mut SessionContext,
    username: &str,
    password: &str,
    ttl_hours: i64,
) -> Result<(User, String), AccountError> {
    if ctx.is_authenticated() {
        return Err(AccountError::PermissionDenied(MSG_ALREADY_LOGGED_IN));
    }

    let user = match authenticate(store, username, password).await {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(%username, error = %e, "login rejected");
            return Err(e);
        }
    };

    let token = session::login(sessions, ctx, user.clone(), ttl_hours).await?;
    Ok((user, token))
}

// =============================================================================
// PASSWORDS
// =============================================================================

/// Replace the user's password with a generated one, revoke their sessions
/// and email the new password to them.
///
/// The email is sent on a background task whose handle is returned, if one
/// was started; callers may drop it. A missing mailer or a user without an
/// email address is logged; the reset itself still applies.
///
/// # Errors
///
/// `NotFound` for unknown usernames; `Store`/`PasswordHash` on write failure.
pub async fn reset_password(
    store: &dyn AccountStore,
    sessions: &dyn SessionStore,
    mailer: Option<Arc<dyn Mailer>>,
    login_url: &str,
    username: &str,
) -> Result<Option<JoinHandle<()>>, AccountError> {
    let user = store
        .find_user_by_username(username)
        .await?
        .ok_or(AccountError::NotFound)?;

    let new_password = password::generate_password();
    let hash = password::hash_password(&new_password)?;
    store.set_password_hash(user.id, &hash).await?;
    let revoked = sessions.delete_user_sessions(user.id, None).await?;
    tracing::info!(user_id = user.id, revoked, "password reset");

    let delivery = match mailer {
        Some(_) if user.email.trim().is_empty() => {
            tracing::warn!(user_id = user.id, "password reset not emailed: user has no email address");
            None
        }
        Some(mailer) => {
            let html = mailer::render_password_reset(&user.username, &new_password, login_url);
            let to = user.email.clone();
            let user_id = user.id;
            Some(tokio::spawn(async move {
                match mailer.send(&to, mailer::PASSWORD_RESET_SUBJECT, &html).await {
                    Ok(()) => tracing::info!(user_id, "password reset email sent"),
                    Err(e) => tracing::error!(user_id, error = %e, "password reset email failed"),
                }
            }))
        }
        None => {
            tracing::warn!(user_id = user.id, "password reset not emailed: mailer not configured");
            None
        }
    };

    Ok(delivery)
}

/// Change `user`'s password after verifying the old one. Every other
/// session of the user is revoked; `keep_token` (the caller's own session)
/// survives.
///
/// # Errors
///
/// `PasswordChangeFailed` for an empty new password or a wrong old password;
/// the stored hash is untouched in both cases.
pub async fn change_password(
    store: &dyn AccountStore,
    sessions: &dyn SessionStore,
    user: &User,
    keep_token: Option<&str>,
    old_password: &str,
    new_password: &str,
) -> Result<(), AccountError> {
    if new_password.is_empty() {
        return Err(AccountError::PasswordChangeFailed(MSG_EMPTY_NEW_PASSWORD));
    }

    // Re-read so a password changed by another session is what gets checked.
    let current = store.find_user(user.id).await?.ok_or(AccountError::NotFound)?;
    if !password::verify_password(old_password, &current.password_hash) {
        return Err(AccountError::PasswordChangeFailed(MSG_INCORRECT_PASSWORD));
    }

    let hash = password::hash_password(new_password)?;
    store.set_password_hash(user.id, &hash).await?;
    let revoked = sessions.delete_user_sessions(user.id, keep_token).await?;
    tracing::info!(user_id = user.id, revoked, "password changed");
    Ok(())
}

// =============================================================================
// USER ACCESS
// =============================================================================

/// Only superusers may list accounts.
///
/// # Errors
///
/// `Unauthenticated` for anonymous sessions, `PermissionDenied` for
/// non-superusers.
pub async fn list_users(store: &dyn AccountStore, ctx: &SessionContext) -> Result<Vec<User>, AccountError> {
    let caller = ctx.require_user()?;
    if !caller.is_superuser {
        return Err(AccountError::PermissionDenied("Only superusers may list users."));
    }
    Ok(store.list_users().await?)
}

/// A user may act on their own record; superusers on any record.
fn ensure_self_or_superuser(ctx: &SessionContext, target: UserId) -> Result<(), AccountError> {
    let caller = ctx.require_user()?;
    if caller.id == target || caller.is_superuser {
        Ok(())
    } else {
        Err(AccountError::PermissionDenied("You do not have permission to access this user."))
    }
}

/// # Errors
///
/// As `ensure_self_or_superuser`, then `NotFound`.
pub async fn get_user(store: &dyn AccountStore, ctx: &SessionContext, id: UserId) -> Result<User, AccountError> {
    ensure_self_or_superuser(ctx, id)?;
    store.find_user(id).await?.ok_or(AccountError::NotFound)
}

/// # Errors
///
/// As `ensure_self_or_superuser`, then `NotFound`.
pub async fn update_user(
    store: &dyn AccountStore,
    ctx: &SessionContext,
    id: UserId,
    update: UserUpdate,
) -> Result<User, AccountError> {
    ensure_self_or_superuser(ctx, id)?;
    store.update_user(id, update).await?.ok_or(AccountError::NotFound)
}

/// # Errors
///
/// As `ensure_self_or_superuser`, then `NotFound`.
pub async fn delete_user(store: &dyn AccountStore, ctx: &SessionContext, id: UserId) -> Result<(), AccountError> {
    ensure_self_or_superuser(ctx, id)?;
    if store.delete_user(id).await? {
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    } else {
        Err(AccountError::NotFound)
    }
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
