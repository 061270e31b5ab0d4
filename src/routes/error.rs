//! Error-to-response mapping for all API routes.
//!
//! Bodies follow `{"detail": "..."}`. Server-side failures are logged here
//! and their text is replaced with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::services::account::AccountError;
use crate::services::roster::RosterError;

const MSG_INTERNAL: &str = "Internal server error.";

pub(crate) fn account_error_to_status(err: &AccountError) -> StatusCode {
    match err {
        AccountError::Authentication(_) | AccountError::Unauthenticated => StatusCode::UNAUTHORIZED,
        AccountError::PasswordChangeFailed(_) | AccountError::Validation(_) => StatusCode::BAD_REQUEST,
        AccountError::NotFound => StatusCode::NOT_FOUND,
        AccountError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        AccountError::PasswordHash(_) | AccountError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn detail_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(serde_json::json!({ "detail": detail }))).into_response()
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = account_error_to_status(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            return detail_response(status, MSG_INTERNAL);
        }
        detail_response(status, &self.to_string())
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "roster export failed");
        detail_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
