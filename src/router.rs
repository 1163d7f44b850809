//! Output routing.
//!
//! The router formats a message for its origin and hands it to each
//! recipient's outbound queue. It decides nothing about membership: callers
//! pass the exact set of recipients, usually a registry snapshot.

use std::sync::Arc;

use relay_proto::format;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::DeliveryError;
use crate::state::Client;

/// Line sink for the operator console's output.
#[derive(Debug, Clone)]
pub struct AdminSink {
    tx: mpsc::UnboundedSender<String>,
}

impl AdminSink {
    /// Create a sink and the receiver the console output task drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emit one line. Dropped silently once the output task is gone.
    pub fn send(&self, line: impl Into<String>) {
        let _ = self.tx.send(line.into());
    }
}

/// Formats and delivers messages.
#[derive(Debug, Clone)]
pub struct Router {
    admin: AdminSink,
}

impl Router {
    pub fn new(admin: AdminSink) -> Self {
        Self { admin }
    }

    /// Queue one unformatted line for `target`.
    pub fn deliver(&self, target: &Client, text: String) -> Result<(), DeliveryError> {
        target.send(text)
    }

    fn fan_out(&self, targets: &[Arc<Client>], line: &str) {
        for target in targets {
            if let Err(e) = self.deliver(target, line.to_string()) {
                debug!(error = %e, "Skipping closed recipient");
            }
        }
    }

    /// `[id] name: text` to every target and to the console.
    pub fn broadcast_from_client(&self, source: &Client, targets: &[Arc<Client>], text: &str) {
        let line = format::client_line(source.id(), source.name(), text);
        self.fan_out(targets, &line);
        self.admin.send(line);
    }

    /// `[SERVER]: text` to one target.
    pub fn server_notice(&self, target: &Client, text: &str) {
        if let Err(e) = self.deliver(target, format::server_notice(text)) {
            debug!(error = %e, "Server notice not delivered");
        }
    }

    /// Server notice to every target; the console sees the bare text.
    pub fn global_server_notice(&self, targets: &[Arc<Client>], text: &str) {
        self.fan_out(targets, &format::server_notice(text));
        self.admin.send(text);
    }

    /// `[ADMIN]: text` to every target, echoed to the console.
    pub fn admin_broadcast(&self, targets: &[Arc<Client>], text: &str) {
        let line = format::admin_broadcast(text);
        self.fan_out(targets, &line);
        self.admin.send(line);
    }

    /// Admin private message to one target, echoed to the console.
    pub fn admin_private_message(&self, target: &Client, text: &str) {
        let line = format::admin_private(target.name(), text);
        if let Err(e) = self.deliver(target, line.clone()) {
            debug!(error = %e, "Admin PM not delivered");
        }
        self.admin.send(line);
    }

    /// Peer private message, delivered to both parties (once if they are
    /// the same connection).
    pub fn private_message(&self, target: &Client, source: &Client, text: &str) {
        let line = format::private_message(&source.identity(), &target.identity(), text);
        if let Err(e) = self.deliver(target, line.clone()) {
            debug!(error = %e, "Private message not delivered");
        }
        if source.id() != target.id() {
            let _ = self.deliver(source, line);
        }
    }

    /// A line for the console only.
    pub fn to_admin(&self, text: impl Into<String>) {
        self.admin.send(text);
    }
}
