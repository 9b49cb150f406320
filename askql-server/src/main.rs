//! askql Server - REST API for natural-language questions over tabular data

mod config;
mod metrics;
mod routes;

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use askql_pipeline::{PipelineConfig, ServiceState};

use config::ServerConfig;
use metrics::ServerMetrics;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ServerConfig::from_env()?;

    // A bad pipeline configuration degrades the service instead of stopping it
    let service = match PipelineConfig::from_env() {
        Ok(pipeline_config) => {
            info!(
                "Loading {} table(s), result cap {}",
                pipeline_config.tables.len(),
                pipeline_config.result_cap
            );
            ServiceState::initialize(&pipeline_config).await
        }
        Err(e) => {
            error!("System init failed: {:#}", e);
            ServiceState::Degraded {
                reason: format!("{:#}", e),
            }
        }
    };

    let state = Arc::new(AppState::new(service, ServerMetrics::new()));
    let app = routes::router(state);

    info!("askql server listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
