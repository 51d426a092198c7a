use pagegate::config::Config;
use pagegate::service::Server;
use tracing::{info, warn};

use crate::cli::Cli;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(cli: Cli) -> Result<(), AnyError> {
    info!("Loading configuration");
    let mut config = Config::load(cli.config)?;
    config.server.port = cli.port;
    config.validate()?;

    let server = Server::bind(&config.server).await?;
    server.run_until(shutdown_signal()).await?;

    info!("Server closed on shutdown signal");
    Ok(())
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
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
    info!("Shutdown signal received");
}
