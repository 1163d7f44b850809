//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the first free port among its candidates and spawns a
//! Connection task for each incoming client.

use crate::config::ListenConfig;
use crate::error::BindError;
use crate::moderation::WordList;
use crate::network::Connection;
use crate::state::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    registry: Arc<Registry>,
    words: Arc<WordList>,
    max_line_len: usize,
    send_queue: usize,
}

impl Gateway {
    /// Bind the configured port, falling back through the pool.
    pub async fn bind(
        config: &ListenConfig,
        registry: Arc<Registry>,
        words: Arc<WordList>,
    ) -> Result<Self, BindError> {
        let mut tried = Vec::with_capacity(config.fallback_ports.len() + 1);

        for port in std::iter::once(config.port).chain(config.fallback_ports.iter().copied()) {
            if tried.contains(&port) {
                continue;
            }
            tried.push(port);

            match TcpListener::bind((config.host.as_str(), port)).await {
                Ok(listener) => {
                    if let Ok(addr) = listener.local_addr() {
                        info!(%addr, "Listener bound");
                    }
                    return Ok(Self {
                        listener,
                        registry,
                        words,
                        max_line_len: config.max_line_length,
                        send_queue: config.send_queue,
                    });
                }
                Err(e) => warn!(host = %config.host, port, error = %e, "Port unavailable"),
            }
        }

        Err(BindError::Exhausted {
            host: config.host.clone(),
            tried,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the gateway, accepting connections until the registry shuts
    /// down. The listener is closed on return.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let shutdown = self.registry.shutdown_token().clone();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Gateway stopping");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!(%addr, population = self.registry.population(), "Connection accepted");
                        let connection = Connection::new(
                            addr,
                            Arc::clone(&self.registry),
                            Arc::clone(&self.words),
                            self.max_line_len,
                            self.send_queue,
                        );
                        tokio::spawn(connection.run(stream));
                    }
                    Err(e) => {
                        error!(error = %e, "Accept failed");
                    }
                },
            }
        }

        Ok(())
    }
}
