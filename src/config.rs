use std::{io::ErrorKind, net::SocketAddr};

use clap::Parser;
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::Deserialize;
use thiserror::Error;

use crate::storage::LedgerLimits;

#[derive(Parser, Debug)]
#[command(name = "atmledger", about = "atmledger - concurrent in-memory account ledger")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "atmledger.toml")]
    pub config: String,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Log level (overrides config file)
    #[arg(short, long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Maximum number of live accounts (overrides config file)
    #[arg(long, env = "MAX_ACCOUNTS")]
    pub max_accounts: Option<usize>,

    /// Largest amount accepted for a single deposit, withdrawal or opening balance
    #[arg(long, env = "MAX_TRANSACTION_AMOUNT")]
    pub max_transaction_amount: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
    #[error("invalid listen address {0}")]
    ListenAddr(String),
    #[error("invalid ledger setting: {0}")]
    Ledger(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,

    #[serde(default = "default_ledger")]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    #[serde(default = "default_max_accounts")]
    pub max_accounts: usize,

    #[serde(default = "default_max_transaction_amount")]
    pub max_transaction_amount: f64,
}

fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_ledger() -> LedgerConfig {
    LedgerConfig {
        max_accounts: default_max_accounts(),
        max_transaction_amount: default_max_transaction_amount(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_accounts() -> usize {
    1000
}

fn default_max_transaction_amount() -> f64 {
    10000.0
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: default_server(),
            logging: default_logging(),
            ledger: default_ledger(),
        }
    }
}

impl Config {
    /// Defaults, then the config file if present, then CLI flags and environment.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
                path: cli.config.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Config::default(),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: cli.config.clone(),
                    source,
                })
            }
        };

        // CLI overrides
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }
        if let Some(max_accounts) = cli.max_accounts {
            config.ledger.max_accounts = max_accounts;
        }
        if let Some(amount) = cli.max_transaction_amount {
            config.ledger.max_transaction_amount = amount;
        }

        config.ledger_limits()?;
        config.listen_addr()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| ConfigError::ListenAddr(addr))
    }

    pub fn ledger_limits(&self) -> Result<LedgerLimits, ConfigError> {
        if self.ledger.max_accounts == 0 {
            return Err(ConfigError::Ledger("max_accounts must be at least 1".to_string()));
        }

        let max_amount = Decimal::from_f64(self.ledger.max_transaction_amount)
            .filter(|amount| *amount > Decimal::ZERO)
            .ok_or_else(|| {
                ConfigError::Ledger(format!(
                    "max_transaction_amount must be a positive number, got {}",
                    self.ledger.max_transaction_amount
                ))
            })?;

        Ok(LedgerLimits::new(self.ledger.max_accounts, max_amount.normalize()))
    }
}
