use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Telegram bot token. When absent the transport runs in disabled mode
    /// and logs messages instead of calling the network.
    pub telegram_bot_token: Option<String>,

    /// Outbox poll interval in milliseconds (default: 10000)
    pub dispatcher_poll_interval_ms: u64,

    /// Maximum number of outbox tasks drained per poll (default: 50)
    pub dispatcher_batch_size: i64,

    /// JWT secret for API authentication
    pub jwt_secret: String,

    /// JWT token expiry in hours
    pub jwt_expiry_hours: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            dispatcher_poll_interval_ms: std::env::var("DISPATCHER_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCHER_POLL_INTERVAL_MS must be a valid u64"))?,
            dispatcher_batch_size: std::env::var("DISPATCHER_BATCH_SIZE")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCHER_BATCH_SIZE must be a valid i64"))?,
            jwt_secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            jwt_expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("JWT_EXPIRY_HOURS must be a valid u64"))?,
        })
    }
}
