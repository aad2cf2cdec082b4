mod cli;

use crate::cli::CLI;
use anyhow::Context;
use clap::Parser;
use keyhole_gateway::app::shutdown_signal;
use keyhole_gateway::{telemetry, App};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CLI::parse();
    telemetry::init(cli.log_format)?;

    let config = cli.gateway_config()?;

    info!(
        listen_addr = %config.listen_addr,
        metadata_backend = %cli.metadata_backend,
        blob_backend = %cli.blob_backend,
        public_base_url = config.public_base_url.as_deref().unwrap_or(""),
        "starting gateway server"
    );

    let state = config
        .build_state()
        .await
        .context("failed to initialise content stores")?;

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}
