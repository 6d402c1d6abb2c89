use std::sync::Arc;

use clap::Parser;
use tokio::signal;

use atmledger::api::{self, AppState};
use atmledger::config::{CliArgs, Config};
use atmledger::storage::{AccountLedger, InMemoryLedger};
use atmledger::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let config = Config::load(&cli)?;

    telemetry::init_tracing(&config.logging)?;
    let metrics = telemetry::install_metrics()?;

    let limits = config.ledger_limits()?;
    tracing::info!(
        max_accounts = limits.max_accounts,
        max_transaction_amount = %limits.max_transaction_amount,
        "Starting atmledger v{}",
        env!("CARGO_PKG_VERSION")
    );

    let ledger: Arc<dyn AccountLedger> = Arc::new(InMemoryLedger::new(limits));
    let app = api::router(AppState::new(ledger, Some(metrics)));

    let addr = config.listen_addr()?;
    tracing::info!("API listening on {}", addr);

    axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down atmledger");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
    tracing::info!("Shutdown signal received");
}
