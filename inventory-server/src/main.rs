use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use inventory_server::config::InventoryConfig;
use inventory_server::{create_app_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "inventory-server")]
#[command(about = "Inventory dashboard web server", long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to ./inventory.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:3000
    #[arg(short, long)]
    listen: Option<String>,

    /// Base URL of the inventory service
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,inventory_server=debug")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = InventoryConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.apply_cli(cli.listen, cli.api_url);

    let addr = config.listen_addr()?;
    let state = AppState::from_config(&config);
    let app = create_app_router(state, &config);

    info!("🚀 Starting inventory dashboard on {}", addr);
    info!("🌐 Inventory service: {}", config.api.base_url);
    info!("📁 Static files: {}", config.server.static_dir.display());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("✅ Inventory dashboard ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("❌ Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("❌ Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
