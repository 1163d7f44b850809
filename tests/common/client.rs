//! Test relay client.
//!
//! Speaks the line protocol directly so tests can assert on exact server
//! output.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use relay_proto::{Handshake, LineReader, LineWriter};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A raw client connection.
pub struct TestClient {
    reader: LineReader,
    writer: LineWriter,
    name: String,
}

impl TestClient {
    /// Open a connection without negotiating.
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = relay_proto::framed(stream, 4096);
        Ok(Self {
            reader,
            writer,
            name: String::new(),
        })
    }

    /// Answer the first prompt with `name`; fail on any rejection.
    pub async fn negotiate(&mut self, name: &str) -> anyhow::Result<()> {
        match self.recv().await?.parse::<Handshake>()? {
            Handshake::Prompt(None) => {}
            other => anyhow::bail!("expected prompt, got {other}"),
        }
        self.send(name).await?;
        match self.recv().await?.parse::<Handshake>()? {
            Handshake::Accepted(accepted) => {
                self.name = accepted;
                Ok(())
            }
            Handshake::Prompt(reason) => anyhow::bail!("name refused: {reason:?}"),
        }
    }

    /// The name the server accepted.
    #[allow(dead_code)]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.send(line.to_string()).await?;
        Ok(())
    }

    /// Receive one line.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    #[allow(dead_code)]
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        match timeout(dur, self.reader.next()).await? {
            Some(line) => Ok(line?),
            None => anyhow::bail!("connection closed"),
        }
    }

    /// Receive lines until the given predicate returns true.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Read until the server closes the connection, returning what arrived.
    #[allow(dead_code)]
    pub async fn recv_to_close(&mut self) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            match timeout(Duration::from_secs(5), self.reader.next()).await? {
                Some(Ok(line)) => lines.push(line),
                Some(Err(_)) | None => return Ok(lines),
            }
        }
    }
}
