use std::collections::BTreeSet;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use offline_eventbridge::client::BusClient;
use offline_eventbridge::config::{Cli, Command, Config};
use offline_eventbridge::manifest::Manifest;
use offline_eventbridge::rules::{RegistrationOutcome, RuleId, SubscriptionRequest};
use offline_eventbridge::{server, EventBridge};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.command.config());

    let result = match cli.command {
        Command::Start(config) => start(config).await,
        Command::Cleanup(config) => cleanup(config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_manifest(config: &Config) -> anyhow::Result<Option<Manifest>> {
    config
        .manifest
        .as_deref()
        .map(Manifest::load)
        .transpose()
        .context("loading function manifest")
}

async fn start(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting EventBridge Server");
    let subscriptions = match load_manifest(&config)? {
        Some(manifest) => manifest.subscriptions()?,
        None => Vec::new(),
    };

    let bridge = Arc::new(EventBridge::builder().config(config.bridge_config()).build());
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let addr = config.listen_addr();
    let server = match TcpListener::bind(&addr).await {
        Ok(listener) => {
            tracing::info!("Listening on {addr}");
            let shutdown = async move {
                let _ = stop_rx.await;
            };
            Some(tokio::spawn(server::serve_with_shutdown(
                bridge, listener, shutdown,
            )))
        }
        // Another bus is already listening there; subscribe against it.
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            tracing::warn!("{addr} is already in use; using the bus listening there");
            None
        }
        Err(e) => return Err(e).with_context(|| format!("binding {addr}")),
    };

    let client = BusClient::new(config.base_url());
    let registered = subscribe_all(&client, &subscriptions).await?;
    tracing::info!(rules = registered.len(), "EventBridge Server Started");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    tracing::info!("Halting offline-eventbridge server");

    if let Err(e) = client.unsubscribe_all(&registered).await {
        tracing::warn!(error = %e, "failed to remove subscriptions");
    }
    let _ = stop_tx.send(());
    if let Some(server) = server {
        server.await.context("server task panicked")??;
    }
    Ok(())
}

async fn subscribe_all(
    client: &BusClient,
    subscriptions: &[SubscriptionRequest],
) -> anyhow::Result<Vec<RuleId>> {
    let mut registered = Vec::new();
    for request in subscriptions {
        let outcomes = client
            .subscribe(request)
            .await
            .with_context(|| format!("subscribing {}", request.name))?;
        for outcome in outcomes {
            match outcome {
                RegistrationOutcome::Registered(id) => registered.push(id),
                RegistrationOutcome::Rejected { error } => {
                    tracing::warn!(function = %request.name, %error, "subscription entry rejected")
                }
            }
        }
        tracing::debug!(
            function = %request.name,
            lambda_port = request.lambda_port,
            "subscribed function"
        );
    }
    Ok(registered)
}

async fn cleanup(config: Config) -> anyhow::Result<()> {
    let functions: Option<BTreeSet<String>> =
        load_manifest(&config)?.map(|manifest| manifest.function_names());
    let client = BusClient::new(config.base_url());

    let ids: Vec<RuleId> = client
        .rules()
        .await?
        .into_iter()
        .filter(|rule| {
            functions
                .as_ref()
                .map_or(true, |names| names.contains(&rule.handler_name))
        })
        .map(|rule| rule.id)
        .collect();

    client.unsubscribe_all(&ids).await?;
    tracing::info!(removed = ids.len(), "removed subscriptions");
    Ok(())
}
