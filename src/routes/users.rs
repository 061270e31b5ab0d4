//! User routes: CRUD, current-session login/logout and passwords.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::auth::{CurrentSession, cleared_session_cookie, session_cookie};
use super::extract::{ApiJson, ApiPath};
use crate::models::{CountryId, School, User, UserId, UserType, UserUpdate};
use crate::services::account::{self, AccountError};
use crate::services::registration::{self, CreateUserRequest};
use crate::services::session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_type: UserType,
    pub is_superuser: bool,
    pub school: Option<School>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_preferences: Option<Vec<CountryId>>,
}

impl UserResponse {
    fn new(user: User, school: Option<School>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            user_type: user.user_type,
            is_superuser: user.is_superuser,
            school,
            country_preferences: None,
        }
    }
}

/// Attach the user's school, if any.
async fn to_response(state: &AppState, user: User) -> Result<UserResponse, AccountError> {
    let school = match user.school_id {
        Some(school_id) => state.store.find_school(school_id).await?,
        None => None,
    };
    Ok(UserResponse::new(user, school))
}

// =============================================================================
// COLLECTION
// =============================================================================

/// `GET /api/users`: superusers only.
pub async fn list_users(
    State(state): State<AppState>,
    CurrentSession(ctx): CurrentSession,
) -> Result<Json<Vec<UserResponse>>, AccountError> {
    let users = account::list_users(state.store.as_ref(), &ctx).await?;
    let mut out = Vec::with_capacity(users.len());
    for user in users {
        out.push(to_response(&state, user).await?);
    }
    Ok(Json(out))
}

/// `POST /api/users`: sign up, optionally with a school and its country
/// preferences.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AccountError> {
    let created = registration::create_user(state.store.as_ref(), body).await?;
    let mut response = UserResponse::new(created.user, created.school);
    response.country_preferences = created.country_preferences;
    Ok((StatusCode::CREATED, Json(response)))
}

// =============================================================================
// DETAIL
// =============================================================================

/// `GET /api/users/:id`
pub async fn get_user(
    State(state): State<AppState>,
    CurrentSession(ctx): CurrentSession,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<UserResponse>, AccountError> {
    let user = account::get_user(state.store.as_ref(), &ctx, id).await?;
    Ok(Json(to_response(&state, user).await?))
}

/// `PUT /api/users/:id`: names and email only.
pub async fn update_user(
    State(state): State<AppState>,
    CurrentSession(ctx): CurrentSession,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(body): ApiJson<UserUpdate>,
) -> Result<Json<UserResponse>, AccountError> {
    let user = account::update_user(state.store.as_ref(), &ctx, id, body).await?;
    Ok(Json(to_response(&state, user).await?))
}

/// `DELETE /api/users/:id`
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentSession(ctx): CurrentSession,
    ApiPath(id): ApiPath<UserId>,
) -> Result<StatusCode, AccountError> {
    account::delete_user(state.store.as_ref(), &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// CURRENT SESSION
// =============================================================================

#[derive(Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /api/users/current`: 404 when anonymous.
pub async fn current_user(
    State(state): State<AppState>,
    CurrentSession(ctx): CurrentSession,
) -> Result<Json<UserResponse>, AccountError> {
    let user = ctx.user().cloned().ok_or(AccountError::NotFound)?;
    Ok(Json(to_response(&state, user).await?))
}

/// `POST /api/users/current`: log in and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentSession(mut ctx): CurrentSession,
    ApiJson(body): ApiJson<LoginBody>,
) -> Result<Response, AccountError> {
    let (user, token) = account::log_in(
        state.store.as_ref(),
        state.store.as_ref(),
        &mut ctx,
        &body.username,
        &body.password,
        state.config.session_ttl_hours,
    )
    .await?;

    let jar = jar.add(session_cookie(token, state.config.cookie_secure, state.config.session_ttl_hours));
    let response = to_response(&state, user).await?;
    Ok((StatusCode::CREATED, jar, Json(response)).into_response())
}

/// `DELETE /api/users/current`: log out; succeeds for anonymous sessions too.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentSession(mut ctx): CurrentSession,
) -> Result<impl IntoResponse, AccountError> {
    session::logout(state.store.as_ref(), &mut ctx).await?;
    let jar = jar.add(cleared_session_cookie(state.config.cookie_secure));
    Ok((jar, StatusCode::NO_CONTENT))
}

// =============================================================================
// PASSWORDS
// =============================================================================

#[derive(Deserialize)]
pub struct ResetPasswordBody {
    #[serde(default)]
    pub username: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordBody {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub new_password: String,
}

/// `POST /api/users/password`: reset and email a new password.
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ResetPasswordBody>,
) -> Result<StatusCode, AccountError> {
    account::reset_password(
        state.store.as_ref(),
        state.store.as_ref(),
        state.mailer.clone(),
        &state.login_url(),
        &body.username,
    )
    .await?;
    Ok(StatusCode::CREATED)
}

/// `PUT /api/users/password`: change the logged-in user's password.
pub async fn change_password(
    State(state): State<AppState>,
    CurrentSession(ctx): CurrentSession,
    ApiJson(body): ApiJson<ChangePasswordBody>,
) -> Result<StatusCode, AccountError> {
    let user = ctx.user().ok_or(AccountError::PermissionDenied(
        "Authentication credentials were not provided.",
    ))?;
    account::change_password(
        state.store.as_ref(),
        state.store.as_ref(),
        user,
        ctx.token(),
        &body.password,
        &body.new_password,
    )
    .await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
