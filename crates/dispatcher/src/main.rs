use std::sync::Arc;

use herald_common::config::AppConfig;
use herald_common::db;
use herald_dispatcher::dispatcher::Dispatcher;
use herald_telegram::TelegramClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald_dispatcher=info,herald_outbox=info".into()),
        )
        .json()
        .init();

    tracing::info!("Courier Herald dispatcher starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Connect to database
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;

    // Run migrations
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    let transport = Arc::new(TelegramClient::new(config.telegram_bot_token.as_deref()));
    let dispatcher = Dispatcher::new(
        pool,
        transport,
        config.dispatcher_poll_interval_ms,
        config.dispatcher_batch_size,
    );

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = dispatcher.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Dispatcher exited with error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("Courier Herald dispatcher stopped.");
    Ok(())
}
