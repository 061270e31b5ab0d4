//! Conference catalog and staff export routes.

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::auth::CurrentSession;
use super::extract::ApiQuery;
use crate::models::{Committee, Country};
use crate::services::account::AccountError;
use crate::services::roster::{self, ROSTER_FILENAME};
use crate::state::AppState;

/// `GET /api/countries`
pub async fn list_countries(State(state): State<AppState>) -> Result<Json<Vec<Country>>, AccountError> {
    Ok(Json(state.store.list_countries().await?))
}

#[derive(Deserialize)]
pub struct CommitteeQuery {
    pub special: Option<bool>,
}

/// `GET /api/committees[?special=true|false]`
pub async fn list_committees(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CommitteeQuery>,
) -> Result<Json<Vec<Committee>>, AccountError> {
    let mut committees = state.store.list_committees().await?;
    if let Some(special) = query.special {
        committees.retain(|c| c.special == special);
    }
    Ok(Json(committees))
}

/// `GET /api/admin/roster.csv`: superusers only.
pub async fn roster_csv(State(state): State<AppState>, CurrentSession(ctx): CurrentSession) -> Response {
    let caller = match ctx.require_user() {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };
    if !caller.is_superuser {
        return AccountError::PermissionDenied("Only superusers may export the roster.").into_response();
    }

    match roster::export(state.store.as_ref()).await {
        Ok(body) => (
            [
                (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
                (CONTENT_DISPOSITION, format!("attachment; filename=\"{ROSTER_FILENAME}\"")),
            ],
            body,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
#[path = "conference_test.rs"]
mod tests;
