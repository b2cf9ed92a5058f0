use anyhow::Context;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::sync::Arc;

use docserver::analysis::AnalysisService;
use docserver::core::config::AppConfig;
use docserver::core::shared::state::{AppState, DatabaseStatus};
use docserver::core::shared::utils::{create_conn, run_migrations};
use docserver::llm::OpenRouterClient;
use docserver::main_module::run_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    info!(
        "Starting docserver {} on {}:{}",
        env!("CARGO_PKG_VERSION"),
        config.server.host,
        config.server.port
    );

    let pool = create_conn(&config.database);
    let migration_pool = pool.clone();
    let db_status = match tokio::task::spawn_blocking(move || run_migrations(&migration_pool))
        .await
        .context("Migration task panicked")?
    {
        Ok(()) => DatabaseStatus::ready(),
        Err(e) => {
            error!("Database initialization failed: {e}");
            DatabaseStatus::failed(e.to_string())
        }
    };

    let client = OpenRouterClient::from_config(&config.llm)
        .context("Failed to build OpenRouter client")?;
    if !client.is_configured() {
        warn!("OPENROUTER_API_KEY is not set; analysis requests will fail");
    }

    let analysis = AnalysisService::new(Arc::new(client), &config);
    let state = Arc::new(AppState {
        conn: pool,
        config,
        analysis,
        db_status,
    });

    run_server(state).await.context("HTTP server failed")?;
    info!("docserver stopped");
    Ok(())
}
