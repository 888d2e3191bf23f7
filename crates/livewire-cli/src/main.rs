//! livewire: command-line follower for the realtime channels.
//!
//! Connects the broadcast channel (and the user channel when a token is
//! given) and prints every delivered message as one JSON line on stdout.
//! Ctrl-C closes both channels.

mod cli;
mod output;

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use livewire_client::{ChannelKind, Client, ClientEvent, Credential};
use livewire_common::ConfigError;
use livewire_config::{apply_env_overrides, toml_loader, LivewireConfig};
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;

use crate::output::render_line;

const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

fn load(path: Option<&str>) -> Result<LivewireConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(Path::new(path))?,
        None => toml_loader::load_default()?,
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

async fn log_events(mut events: broadcast::Receiver<ClientEvent>) {
    loop {
        match events.recv().await {
            Ok(ClientEvent::StatusChanged { channel, status }) => {
                tracing::info!(channel = %channel, status = %status, "Status changed");
            }
            Ok(ClientEvent::ReconnectScheduled {
                channel,
                attempt,
                delay,
            }) => {
                tracing::info!(
                    channel = %channel,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Reconnect scheduled"
                );
            }
            Ok(ClientEvent::ReconnectsExhausted { channel, attempts }) => {
                tracing::error!(channel = %channel, attempts, "Gave up reconnecting");
            }
            Ok(ClientEvent::CredentialRefreshed) => tracing::info!("Credential refreshed"),
            Ok(ClientEvent::CredentialRefreshFailed { error }) => {
                tracing::error!(error = %error, "Credential refresh failed; log in again");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Event stream lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let loaded = load(args.config.as_deref());
    let default_level = match &loaded {
        Ok(config) => config.logging.level.as_directive(),
        Err(_) => "info",
    };
    let log_directive = args.log_level.as_deref().unwrap_or(default_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(
            log_directive
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
        ))
        .init();

    tracing::info!("livewire v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        LivewireConfig::default()
    });

    let credential = Credential::new(args.token.clone().unwrap_or_default());
    let client = match Client::builder(&config, credential).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Cannot start client: {e}");
            return ExitCode::FAILURE;
        }
    };

    tokio::spawn(log_events(client.subscribe()));

    let (lines_tx, mut lines_rx) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        while let Some(line) = lines_rx.recv().await {
            println!("{line}");
        }
    });

    let tx = lines_tx.clone();
    client.connect_broadcast(move |message| {
        let _ = tx.send(render_line(ChannelKind::Broadcast, &message));
    });

    if args.follows_user() {
        let tx = lines_tx.clone();
        client.connect_user(move |message| {
            let _ = tx.send(render_line(ChannelKind::User, &message));
        });
    } else {
        tracing::info!("No token given or broadcast-only; user channel stays closed");
    }
    drop(lines_tx);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
    }

    tracing::info!("Shutting down");
    client.close();
    tokio::time::sleep(SHUTDOWN_GRACE).await;
    drop(client);
    printer.abort();
    ExitCode::SUCCESS
}
