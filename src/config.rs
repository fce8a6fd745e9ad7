//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded from environment variables (with `.env` support).
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL (env: DATABASE_URL)
    pub database_url: String,
    /// HTTP listen port (env: HTTP_PORT)
    pub http_port: u16,
    /// Default log filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let http_port = match std::env::var("HTTP_PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| format!("HTTP_PORT must be a port number, got {p:?}"))?,
            Err(_) => 8080,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://coral-pos.db".into()),
            http_port,
            log_filter: std::env::var("LOG_FILTER")
                .unwrap_or_else(|_| "coral_pos=info,tower_http=info".into()),
        })
    }
}
