//! Tracing and metrics initialization for the server binary.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] BuildError),
}

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence over
/// the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| TelemetryError::Filter(e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| TelemetryError::Subscriber(e.to_string()))
}

/// Installs the Prometheus recorder behind the `metrics` facade. Can only
/// succeed once per process.
pub fn install_metrics() -> Result<PrometheusHandle, TelemetryError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    metrics::describe_counter!(
        "atmledger_transactions_total",
        "Deposits and withdrawals by kind and outcome"
    );
    metrics::describe_counter!("atmledger_accounts_created_total", "Accounts opened");
    metrics::describe_counter!("atmledger_accounts_deleted_total", "Accounts deleted");
    metrics::describe_gauge!("atmledger_accounts", "Live accounts");
}
