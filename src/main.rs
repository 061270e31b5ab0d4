mod config;
mod db;
mod models;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

use services::mailer::{Mailer, ResendMailer};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    // Mail is optional: resets still apply, the new password just isn't sent.
    let mailer: Option<Arc<dyn Mailer>> = match &config.mail {
        Some(mail) => {
            tracing::info!(from = %mail.from, "mailer configured");
            Some(Arc::new(ResendMailer::new(mail)))
        }
        None => {
            tracing::warn!("RESEND_API_KEY or RESEND_FROM not set, password reset emails disabled");
            None
        }
    };

    let port = config.port;
    let store = Arc::new(db::PgStore::new(pool));
    let state = state::AppState::new(store, mailer, config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "huxley listening");
    axum::serve(listener, app).await.expect("server failed");
}
