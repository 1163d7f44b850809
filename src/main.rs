//! relayd - line-oriented chat relay
//!
//! Accepts TCP clients, negotiates a display name for each, and relays their
//! lines to one another. An operator console on stdin/stdout can message,
//! warn, list and shut down. Logs go to stderr.

mod admin;
mod args;
mod config;
mod error;
mod moderation;
mod network;
mod router;
mod state;

use crate::admin::{AdminConsole, ConsoleExit};
use crate::args::ServerArgs;
use crate::config::Config;
use crate::moderation::WordList;
use crate::network::Gateway;
use crate::router::{AdminSink, Router};
use crate::state::{NameRules, Registry};
use futures_util::SinkExt;
use relay_proto::LineCodec;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio_util::codec::FramedWrite;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout belongs to the console.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = ServerArgs::parse(std::env::args().skip(1));

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to load config");
            e
        })?,
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.listen.port = port;
    }
    config.validate()?;

    info!(server = %config.server.name, "Starting relayd");

    let words = WordList::load(
        &config.moderation.word_list,
        &config.moderation.section_marker,
        config.moderation.min_word_length,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to load word list");
        e
    })?;

    if words.is_empty() {
        warn!("Word list is empty; bad-word filtering is disabled");
    }

    let (admin_sink, admin_rx) = AdminSink::channel();
    let registry = Arc::new(Registry::new(
        Router::new(admin_sink),
        NameRules::new(&config.names),
        config.moderation.warning_threshold,
    ));

    let gateway = Gateway::bind(&config.listen, Arc::clone(&registry), Arc::new(words))
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to bind listener");
            e
        })?;

    let listen_addr = gateway.local_addr()?;

    let console_done = CancellationToken::new();
    let console_output = tokio::spawn(write_console(admin_rx, console_done.clone()));
    let gateway_task = tokio::spawn(gateway.run());

    registry
        .router()
        .to_admin(format!("Server listening on {listen_addr}"));

    let console = AdminConsole::new(Arc::clone(&registry));
    match console.run(BufReader::new(tokio::io::stdin())).await {
        ConsoleExit::Shutdown => {
            gateway_task.await??;
            registry.router().to_admin("Server successfully shut down.");
            console_done.cancel();
            let _ = console_output.await;
            info!("Shutdown complete");
        }
        ConsoleExit::InputClosed => {
            // Without a console only the gateway keeps the process alive.
            gateway_task.await??;
        }
    }

    Ok(())
}

/// Print console lines to stdout until `done`, then flush what is queued.
async fn write_console(mut rx: mpsc::UnboundedReceiver<String>, done: CancellationToken) {
    let mut out = FramedWrite::new(tokio::io::stdout(), LineCodec::new());

    loop {
        tokio::select! {
            biased;
            line = rx.recv() => match line {
                Some(line) => {
                    if out.send(line).await.is_err() {
                        return;
                    }
                }
                None => break,
            },
            _ = done.cancelled() => {
                while let Ok(line) = rx.try_recv() {
                    if out.feed(line).await.is_err() {
                        break;
                    }
                }
                break;
            }
        }
    }

    let _ = out.flush().await;
}
