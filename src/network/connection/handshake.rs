use crate::error::{HandshakeError, NameError};
use crate::state::{Client, Registry};
use futures_util::{SinkExt, StreamExt};
use relay_proto::{Handshake, LineReader, LineWriter};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tracing::debug;

/// A freshly registered client and the queue its writer task will drain.
pub(super) struct Registered {
    pub client: Arc<Client>,
    pub outbound: mpsc::Receiver<String>,
    /// Keeps shutdown waiting until the writer task is running.
    pub writer_token: TaskTrackerToken,
}

/// Run name negotiation on a fresh transport.
///
/// Prompts, reads one candidate per prompt and re-prompts with the refusal
/// reason until a legal, unclaimed name is registered. The success line is
/// written directly so it precedes everything already queued for the new
/// client (its welcome lines among them).
pub(super) async fn negotiate(
    registry: &Registry,
    addr: SocketAddr,
    send_queue: usize,
    reader: &mut LineReader,
    writer: &mut LineWriter,
) -> Result<Registered, HandshakeError> {
    let shutdown = registry.shutdown_token().clone();
    writer.send(Handshake::Prompt(None).to_string()).await?;

    loop {
        let candidate = tokio::select! {
            _ = shutdown.cancelled() => return Err(HandshakeError::ShuttingDown),
            line = reader.next() => match line {
                Some(line) => line?,
                None => return Err(HandshakeError::Closed),
            },
        };

        let rejection = match registry.name_rules().validate(&candidate) {
            Ok(choice) => {
                let (tx, rx) = mpsc::channel(send_queue);
                let writer_token = registry.writer_token();
                match registry.register(choice, addr, tx) {
                    Ok(client) => {
                        let accepted = Handshake::Accepted(client.name().to_string());
                        if let Err(e) = writer.send(accepted.to_string()).await {
                            registry.disconnect(&client);
                            return Err(e.into());
                        }
                        return Ok(Registered {
                            client,
                            outbound: rx,
                            writer_token,
                        });
                    }
                    Err(NameError::ShuttingDown) => return Err(HandshakeError::ShuttingDown),
                    Err(e) => e,
                }
            }
            Err(e) => e,
        };

        debug!(%addr, code = rejection.error_code(), "Name rejected");
        writer
            .send(Handshake::Prompt(Some(rejection.to_string())).to_string())
            .await?;
    }
}
