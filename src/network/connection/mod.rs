//! Connection - Handles an individual client connection.
//!
//! Each accepted socket runs in its own Tokio task:
//!
//! ```text
//! Phase 1: Handshake (FramedRead + FramedWrite, sequential)
//!    ↓ registered
//! Phase 2: two tasks per connection
//!    ┌──────────────────────────┐     ┌──────────────────────────┐
//!    │ input loop (this task)   │     │ writer task (tracked)    │
//!    │  FramedRead → dispatch   │     │  mpsc queue → FramedWrite│
//!    │  select! on close token  │     │  drains on close token   │
//!    └──────────────────────────┘     └──────────────────────────┘
//! ```
//!
//! Everything routed to the client goes through its queue, so one
//! connection's lines arrive in the order they were queued.

mod dispatch;
mod error_handling;
mod handshake;
mod writer;

use dispatch::{DispatchResult, process_line};
use error_handling::{READ_FAULT_NOTICE, ReadErrorAction, classify_read_error};

use crate::moderation::WordList;
use crate::state::{Client, Registry};
use futures_util::StreamExt;
use relay_proto::LineReader;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};

/// A client connection handler.
pub struct Connection {
    addr: SocketAddr,
    registry: Arc<Registry>,
    words: Arc<WordList>,
    max_line_len: usize,
    send_queue: usize,
}

impl Connection {
    pub fn new(
        addr: SocketAddr,
        registry: Arc<Registry>,
        words: Arc<WordList>,
        max_line_len: usize,
        send_queue: usize,
    ) -> Self {
        Self {
            addr,
            registry,
            words,
            max_line_len,
            send_queue,
        }
    }

    /// Negotiate a name, then serve the client until it leaves.
    ///
    /// Setup failures drop the transport without registering anything.
    #[instrument(skip_all, fields(addr = %self.addr), name = "connection")]
    pub async fn run(self, stream: TcpStream) {
        let (mut reader, mut writer) = relay_proto::framed(stream, self.max_line_len);

        let registered = match handshake::negotiate(
            &self.registry,
            self.addr,
            self.send_queue,
            &mut reader,
            &mut writer,
        )
        .await
        {
            Ok(registered) => registered,
            Err(e) => {
                debug!(error = %e, code = e.error_code(), "Handshake abandoned");
                return;
            }
        };

        let client = registered.client;
        self.registry.spawn_writer(writer::drain(
            client.closed().clone(),
            registered.outbound,
            writer,
        ));
        drop(registered.writer_token);

        self.input_loop(&client, reader).await;
    }

    async fn input_loop(&self, client: &Arc<Client>, mut reader: LineReader) {
        loop {
            let next = tokio::select! {
                biased;
                _ = client.closed().cancelled() => {
                    debug!(id = client.id(), "Connection closed out of band");
                    break;
                }
                next = reader.next() => next,
            };

            match next {
                Some(Ok(line)) => {
                    if process_line(&self.registry, &self.words, client, &line)
                        == DispatchResult::Exit
                    {
                        info!(id = client.id(), "Client exited");
                        break;
                    }
                }
                Some(Err(e)) => {
                    match classify_read_error(&e) {
                        ReadErrorAction::FatalProtocolError { error_msg } => {
                            warn!(id = client.id(), error = %error_msg, "Protocol violation");
                        }
                        ReadErrorAction::IoError => {
                            debug!(id = client.id(), error = %e, "Read failed");
                        }
                    }
                    self.read_fault(client);
                    break;
                }
                None => {
                    debug!(id = client.id(), "Peer closed the connection");
                    self.read_fault(client);
                    break;
                }
            }
        }

        // No-op when moderation or shutdown already removed the client.
        self.registry.disconnect(client);
    }

    fn read_fault(&self, client: &Client) {
        if !client.is_closed() {
            self.registry.router().server_notice(client, READ_FAULT_NOTICE);
        }
    }
}
