//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds every HTTP endpoint under `/api` plus `/healthz` on a
//! single Axum router. Session cookies are resolved per handler through the
//! `CurrentSession` extractor.

pub mod auth;
pub mod conference;
pub mod error;
pub mod extract;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/current",
            get(users::current_user)
                .post(users::login)
                .delete(users::logout),
        )
        .route(
            "/api/users/password",
            axum::routing::post(users::reset_password).put(users::change_password),
        )
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/countries", get(conference::list_countries))
        .route("/api/committees", get(conference::list_committees))
        .route("/api/admin/roster.csv", get(conference::roster_csv))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
