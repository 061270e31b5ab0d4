//! Session binding for HTTP requests.
//!
//! ARCHITECTURE
//! ============
//! Each request carries at most one opaque token (the `session_token`
//! cookie). The routes resolve it into a `SessionContext` once and pass that
//! value explicitly into every account operation; nothing reads ambient
//! request state.
//!
//! TRADE-OFFS
//! ==========
//! Sessions are server-side rows, so logout takes effect immediately and a
//! password reset or change revokes the user's other sessions, at the cost
//! of one lookup per authenticated request.

use std::fmt::Write;

use rand::Rng;

use super::account::AccountError;
use crate::models::User;
use crate::store::{AccountStore, SessionStore};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// The session state of one request: anonymous, or bound to a user.
///
/// A presented token is kept even when it does not resolve to a user, so
/// logout can still delete its row.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    token: Option<String>,
    user: Option<User>,
}

impl SessionContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated(token: String, user: User) -> Self {
        Self { token: Some(token), user: Some(user) }
    }

    /// Resolve a presented token. Unknown, expired or inactive sessions
    /// resolve to anonymous (keeping the token) rather than failing the
    /// request.
    ///
    /// # Errors
    ///
    /// Returns a store error if the lookups fail.
    pub async fn resolve(
        accounts: &dyn AccountStore,
        sessions: &dyn SessionStore,
        token: Option<&str>,
    ) -> Result<Self, AccountError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Self::anonymous());
        };
        let unresolved = Self { token: Some(token.to_owned()), user: None };
        let Some(user_id) = sessions.session_user(token).await? else {
            return Ok(unresolved);
        };
        match accounts.find_user(user_id).await? {
            Some(user) if user.is_active => Ok(Self::authenticated(token.to_owned(), user)),
            _ => Ok(unresolved),
        }
    }

    /// Authenticated means a user is bound; an anonymous context may still
    /// carry an unresolved token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The bound user, or `Unauthenticated`.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Unauthenticated` for anonymous sessions.
    pub fn require_user(&self) -> Result<&User, AccountError> {
        self.user.as_ref().ok_or(AccountError::Unauthenticated)
    }
}

/// Bind `user` to the session under a fresh token and return the token.
/// A token already held by the context is revoked first.
///
/// # Errors
///
/// Returns a store error if the session row cannot be written.
pub async fn login(
    sessions: &dyn SessionStore,
    ctx: &mut SessionContext,
    user: User,
    ttl_hours: i64,
) -> Result<String, AccountError> {
    if let Some(previous) = ctx.token.take() {
        sessions.delete_session(&previous).await?;
    }

    let token = generate_token();
    sessions.create_session(&token, user.id, ttl_hours).await?;
    tracing::info!(user_id = user.id, "session created");

    ctx.token = Some(token.clone());
    ctx.user = Some(user);
    Ok(token)
}

/// Clear the session binding. Calling it on an anonymous context is a no-op.
///
/// # Errors
///
/// Returns a store error if the session row cannot be deleted.
pub async fn logout(sessions: &dyn SessionStore, ctx: &mut SessionContext) -> Result<(), AccountError> {
    if let Some(token) = ctx.token.take() {
        sessions.delete_session(&token).await?;
        if let Some(user) = &ctx.user {
            tracing::info!(user_id = user.id, "session ended");
        }
    }
    ctx.user = None;
    Ok(())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
