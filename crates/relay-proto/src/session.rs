//! Client-side connection setup.
//!
//! [`connect`] finds a listening server, [`Session::negotiate`] runs the name
//! handshake over it. The resulting [`Session`] is a plain value that any
//! client behavior (interactive terminal, bot) consumes by splitting it into
//! its framed halves.

use std::net::SocketAddr;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info};

use crate::error::SessionError;
use crate::handshake::Handshake;
use crate::line::LineCodec;

/// Framed read half of a relay connection.
pub type LineReader = FramedRead<OwnedReadHalf, LineCodec>;
/// Framed write half of a relay connection.
pub type LineWriter = FramedWrite<OwnedWriteHalf, LineCodec>;

/// Split a TCP stream into framed line halves sharing one line limit.
pub fn framed(stream: TcpStream, max_line_len: usize) -> (LineReader, LineWriter) {
    let (read, write) = stream.into_split();
    (
        FramedRead::new(read, LineCodec::with_max_len(max_line_len)),
        FramedWrite::new(write, LineCodec::with_max_len(max_line_len)),
    )
}

/// Supplies candidate names during negotiation.
#[async_trait]
pub trait NameSource: Send {
    /// Produce the next candidate. `reason` is `None` for the first prompt
    /// and carries the server's explanation after a rejection.
    async fn next_name(&mut self, reason: Option<&str>) -> Result<String, SessionError>;
}

/// A name source that offers one name and gives up if it is refused.
#[derive(Debug, Clone)]
pub struct FixedName {
    name: String,
    offered: bool,
}

impl FixedName {
    /// Offer `name` at the first prompt.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offered: false,
        }
    }
}

#[async_trait]
impl NameSource for FixedName {
    async fn next_name(&mut self, reason: Option<&str>) -> Result<String, SessionError> {
        if self.offered {
            let reason = reason.unwrap_or("name refused");
            return Err(SessionError::NameRejected(reason.to_string()));
        }
        self.offered = true;
        Ok(self.name.clone())
    }
}

/// Connect to `host`, trying `port` first and then each fallback port once.
pub async fn connect(host: &str, port: u16, fallback: &[u16]) -> Result<TcpStream, SessionError> {
    let mut tried = Vec::with_capacity(fallback.len() + 1);

    for candidate in std::iter::once(port).chain(fallback.iter().copied()) {
        if tried.contains(&candidate) {
            continue;
        }
        tried.push(candidate);

        match TcpStream::connect((host, candidate)).await {
            Ok(stream) => {
                info!(host, port = candidate, "Connected to relay");
                return Ok(stream);
            }
            Err(e) => debug!(host, port = candidate, error = %e, "Connect attempt failed"),
        }
    }

    Err(SessionError::Unreachable {
        host: host.to_string(),
        tried,
    })
}

/// A connection whose name negotiation has completed.
#[derive(Debug)]
pub struct Session {
    name: String,
    peer: SocketAddr,
    reader: LineReader,
    writer: LineWriter,
}

impl Session {
    /// Run the name handshake, asking `names` for a candidate at every
    /// prompt until the server accepts one.
    pub async fn negotiate<N>(stream: TcpStream, names: &mut N) -> Result<Self, SessionError>
    where
        N: NameSource + ?Sized,
    {
        let peer = stream.peer_addr()?;
        let (mut reader, mut writer) = framed(stream, crate::line::DEFAULT_MAX_LINE_LEN);

        loop {
            let line = match reader.next().await {
                Some(line) => line?,
                None => return Err(SessionError::Closed),
            };

            match line.parse::<Handshake>()? {
                Handshake::Prompt(reason) => {
                    let candidate = names.next_name(reason.as_deref()).await?;
                    writer.send(candidate).await?;
                }
                Handshake::Accepted(name) => {
                    debug!(%peer, name = %name, "Name accepted");
                    return Ok(Self {
                        name,
                        peer,
                        reader,
                        writer,
                    });
                }
            }
        }
    }

    /// The name the server registered, which may differ from the candidate
    /// (anonymous joins are numbered by the server).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address of the server this session talks to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Hand over the framed halves for the post-handshake phase.
    pub fn split(self) -> (LineReader, LineWriter) {
        (self.reader, self.writer)
    }
}
