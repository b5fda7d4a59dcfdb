//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::bridge::BridgeConfig;

#[derive(Debug, Parser)]
#[command(
    name = "offline-eventbridge",
    version,
    about = "Listens to offline EventBridge events and passes them to configured Lambda functions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the bus, subscribe the manifest's functions, and run until Ctrl-C.
    Start(Config),
    /// Remove the manifest's subscriptions from a running bus.
    Cleanup(Config),
}

impl Command {
    pub fn config(&self) -> &Config {
        match self {
            Command::Start(config) | Command::Cleanup(config) => config,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Config {
    /// Host the bus listens on.
    #[arg(long, env = "EVENTBRIDGE_HOST", default_value = "localhost")]
    pub host: String,

    /// Port the bus listens on.
    #[arg(long, env = "EVENTBRIDGE_PORT", default_value_t = 4002)]
    pub port: u16,

    /// Log debug output from the bus.
    #[arg(long, env = "EVENTBRIDGE_DEBUG")]
    pub debug: bool,

    /// Host of the Lambda-compatible endpoint that serves the functions.
    #[arg(long, env = "EVENTBRIDGE_LAMBDA_HOST", default_value = "localhost")]
    pub lambda_host: String,

    /// Give up on a handler call after this many milliseconds (default: wait forever).
    #[arg(long, env = "EVENTBRIDGE_INVOKE_TIMEOUT_MS")]
    pub invoke_timeout_ms: Option<u64>,

    /// TOML manifest of functions to subscribe.
    #[arg(long, env = "EVENTBRIDGE_MANIFEST")]
    pub manifest: Option<PathBuf>,
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Root URL of the bus, as seen by local clients.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            lambda_host: self.lambda_host.clone(),
            invoke_timeout: self.invoke_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "info,offline_eventbridge=debug"
        } else {
            "info"
        }
    }
}
