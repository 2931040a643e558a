mod api;
mod cli;
mod db;
mod label_cache;
mod processing;
mod router;
mod startup;
mod state;
mod store;

use clap::Parser;
use tracing::info;

use exguard_core::{AlertInput, Config};
use exguard_rules::Evaluator;

use crate::cli::{Cli, Command};

fn load_config() -> Config {
    exguard_core::config::load_dotenv();
    Config::from_env()
}

async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = startup::build_app_state(&config).await?;
    let app = router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Alert Webhook Service listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn evaluate_once(config: &Config, alert: AlertInput) -> anyhow::Result<()> {
    alert.validate()?;
    let pool = db::init_pg_pool(&config.postgres).await;
    let evaluator = startup::build_evaluator(config, pool.as_ref())?;

    let result = evaluator.evaluate(&alert).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config();
    config.log_summary();

    match cli.command {
        None => serve(config, None, None).await,
        Some(Command::Serve { host, port }) => serve(config, host, port).await,
        Some(Command::Evaluate {
            chain_id,
            attacked,
            exploiter,
            tx_hash,
        }) => evaluate_once(&config, AlertInput::new(chain_id, attacked, exploiter, tx_hash)).await,
    }
}
