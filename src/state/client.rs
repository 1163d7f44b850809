//! Per-connection record.
//!
//! A `Client` is created by the registry once a name has been negotiated and
//! is shared (`Arc`) between the registry, the connection's input task and
//! any task routing to it. Identity fields never change; the warning count
//! only grows.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};

use relay_proto::format;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::DeliveryError;

/// Unique identifier for a connection. Assigned from 0 upward, never reused.
pub type ClientId = u64;

/// One live client session.
#[derive(Debug)]
pub struct Client {
    id: ClientId,
    name: String,
    addr: SocketAddr,
    /// Bounded queue drained by the connection's writer task.
    outbound: mpsc::Sender<String>,
    warnings: AtomicU32,
    warning_threshold: u32,
    /// Cancelled exactly when the connection is being torn down.
    closed: CancellationToken,
}

impl Client {
    pub fn new(
        id: ClientId,
        name: String,
        addr: SocketAddr,
        outbound: mpsc::Sender<String>,
        warning_threshold: u32,
    ) -> Self {
        Self {
            id,
            name,
            addr,
            outbound,
            warnings: AtomicU32::new(0),
            warning_threshold,
            closed: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Public identity, `name(id)`.
    pub fn identity(&self) -> String {
        format::identity(&self.name, self.id)
    }

    /// Queue one line for this connection without waiting.
    ///
    /// A full queue means the peer stopped reading. The connection is
    /// closed, and its input task then removes it from the registry.
    pub fn send(&self, line: String) -> Result<(), DeliveryError> {
        if self.closed.is_cancelled() {
            return Err(DeliveryError::Closed(self.id));
        }
        match self.outbound.try_send(line) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(id = self.id, name = %self.name, "Send queue exceeded");
                self.close();
                Err(DeliveryError::QueueFull(self.id))
            }
            Err(TrySendError::Closed(_)) => Err(DeliveryError::Closed(self.id)),
        }
    }

    pub fn warnings(&self) -> u32 {
        self.warnings.load(Ordering::Acquire)
    }

    pub fn warning_threshold(&self) -> u32 {
        self.warning_threshold
    }

    /// Add `amount` warnings, returning the counts before and after.
    ///
    /// Concurrent callers each see a distinct `(before, after)` window, so
    /// exactly one of them observes the threshold being crossed.
    pub fn add_warnings(&self, amount: u32) -> (u32, u32) {
        let before = self
            .warnings
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(amount))
            })
            .unwrap_or_else(|n| n);
        (before, before.saturating_add(amount))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Signal the reader loop and writer task to stop. Idempotent.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Token observed by the tasks serving this connection.
    pub fn closed(&self) -> &CancellationToken {
        &self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> (Client, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(4);
        let addr = "127.0.0.1:5000".parse().unwrap();
        (Client::new(4, "alice".into(), addr, tx, 3), rx)
    }

    #[test]
    fn test_identity() {
        let (client, _rx) = test_client();
        assert_eq!(client.identity(), "alice(4)");
    }

    #[test]
    fn test_send_queues_in_order() {
        let (client, mut rx) = test_client();
        client.send("one".into()).unwrap();
        client.send("two".into()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), "one");
        assert_eq!(rx.try_recv().unwrap(), "two");
    }

    #[test]
    fn test_send_after_close_fails() {
        let (client, _rx) = test_client();
        client.close();
        client.close();
        assert!(client.is_closed());
        assert_eq!(client.send("late".into()), Err(DeliveryError::Closed(4)));
    }

    #[test]
    fn test_send_to_dropped_queue_fails() {
        let (client, rx) = test_client();
        drop(rx);
        assert_eq!(client.send("x".into()), Err(DeliveryError::Closed(4)));
    }

    #[test]
    fn test_full_queue_closes_slow_consumer() {
        let (client, mut rx) = test_client();
        for i in 0..4 {
            client.send(format!("line {i}")).unwrap();
        }

        assert_eq!(
            client.send("one too many".into()),
            Err(DeliveryError::QueueFull(4))
        );
        assert!(client.is_closed());
        assert_eq!(client.send("later".into()), Err(DeliveryError::Closed(4)));

        // What was queued before the overflow is still there for the writer.
        assert_eq!(rx.try_recv().unwrap(), "line 0");
    }

    #[test]
    fn test_add_warnings_saturates() {
        let (client, _rx) = test_client();
        assert_eq!(client.add_warnings(1), (0, 1));
        assert_eq!(client.add_warnings(2), (1, 3));
        assert_eq!(client.add_warnings(u32::MAX), (3, u32::MAX));
        assert_eq!(client.warnings(), u32::MAX);
    }
}
