//! coral-pos — point-of-sale backend
//!
//! Long-running service that serves the staff UI's REST API: menu and
//! category management, order intake with total reconciliation, and daily
//! sales analytics.

use coral_pos::{api, config::Config, state::AppState};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("Starting coral-pos (db: {})", config.database_url);

    let state = AppState::new(config.clone()).await?;
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("coral-pos listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
