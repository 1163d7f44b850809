//! The authoritative set of live connections.
//!
//! All membership changes and every snapshot taken for a broadcast go
//! through one `parking_lot::Mutex`. The lock is never held across an
//! `.await` and never while delivering: callers get a `Vec<Arc<Client>>`
//! snapshot and fan out after release.

use std::collections::BTreeMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::{TaskTracker, task_tracker::TaskTrackerToken};
use tracing::{info, warn};

use super::client::{Client, ClientId};
use super::names::{NameChoice, NameRules};
use crate::error::NameError;
use crate::router::Router;

/// Sent to every connection when the server stops.
pub const SHUTDOWN_NOTICE: &str = "Server is shutting down.";

/// Reply when a command names a client that is not registered.
pub const USER_NOT_FOUND: &str = "User not found.";

/// Upper bound on waiting for writers to flush during shutdown.
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of recording warnings against a client.
#[derive(Debug)]
pub(crate) enum Strike {
    /// The client is no longer registered; nothing was recorded.
    Unregistered,
    /// Recorded; the client stays.
    Counted { count: u32 },
    /// Recorded and the threshold was reached. The client has already been
    /// removed; `remaining` is the membership left behind.
    Expelled {
        count: u32,
        remaining: Vec<Arc<Client>>,
    },
}

struct Inner {
    clients: BTreeMap<ClientId, Arc<Client>>,
    next_id: ClientId,
    anonymous_joins: u64,
}

/// Live connection registry.
pub struct Registry {
    inner: Mutex<Inner>,
    router: Router,
    rules: NameRules,
    warning_threshold: u32,
    /// Writer tasks, awaited on shutdown so queued notices flush.
    writers: TaskTracker,
    shutdown: CancellationToken,
}

impl Registry {
    pub fn new(router: Router, rules: NameRules, warning_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                clients: BTreeMap::new(),
                next_id: 0,
                anonymous_joins: 0,
            }),
            router,
            rules,
            warning_threshold,
            writers: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn name_rules(&self) -> &NameRules {
        &self.rules
    }

    /// Cancelled once `shutdown` starts.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Insert a new connection under a legal name.
    ///
    /// Uniqueness is checked under the same lock as the insertion, so two
    /// racing handshakes can never both claim one name. On success the
    /// existing connections are told about the join before the newcomer's
    /// welcome lines are queued.
    pub fn register(
        &self,
        choice: NameChoice,
        addr: SocketAddr,
        outbound: mpsc::Sender<String>,
    ) -> Result<Arc<Client>, NameError> {
        let (client, existing, population) = {
            let mut inner = self.inner.lock();
            if self.shutdown.is_cancelled() {
                return Err(NameError::ShuttingDown);
            }

            let name = match choice {
                NameChoice::Named(name) => {
                    if Self::name_taken(&inner.clients, &name) {
                        return Err(NameError::Taken(name));
                    }
                    name
                }
                NameChoice::Anonymous => loop {
                    inner.anonymous_joins += 1;
                    let name = format!("Anonymous {}", inner.anonymous_joins);
                    if !Self::name_taken(&inner.clients, &name) {
                        break name;
                    }
                },
            };

            let id = inner.next_id;
            inner.next_id += 1;

            let client = Arc::new(Client::new(id, name, addr, outbound, self.warning_threshold));
            let existing: Vec<_> = inner.clients.values().cloned().collect();
            inner.clients.insert(id, Arc::clone(&client));
            (client, existing, inner.clients.len())
        };

        info!(id = client.id(), name = %client.name(), %addr, population, "Client registered");

        self.router.global_server_notice(
            &existing,
            &format!("New user has joined! Online users: {population}"),
        );
        for line in welcome_lines(&client) {
            self.router.server_notice(&client, &line);
        }

        Ok(client)
    }

    fn name_taken(clients: &BTreeMap<ClientId, Arc<Client>>, name: &str) -> bool {
        let wanted = name.to_lowercase();
        clients.values().any(|c| c.name().to_lowercase() == wanted)
    }

    pub fn get(&self, id: ClientId) -> Option<Arc<Client>> {
        self.inner.lock().clients.get(&id).cloned()
    }

    /// Stable snapshot of every live connection, ascending by id.
    pub fn snapshot(&self) -> Vec<Arc<Client>> {
        self.inner.lock().clients.values().cloned().collect()
    }

    pub fn population(&self) -> usize {
        self.inner.lock().clients.len()
    }

    /// Relay a chat line to every live connection except its sender.
    pub fn broadcast_from(&self, source: &Client, text: &str) {
        let targets: Vec<_> = {
            let inner = self.inner.lock();
            inner
                .clients
                .values()
                .filter(|c| c.id() != source.id())
                .cloned()
                .collect()
        };
        self.router.broadcast_from_client(source, &targets, text);
    }

    /// Remove a connection and close its handles.
    ///
    /// The entry is removed only if the id still maps to this exact client,
    /// so racing callers (moderation vs. a read fault) produce one departure
    /// notice between them. Returns whether this call did the removal.
    pub fn disconnect(&self, client: &Arc<Client>) -> bool {
        let remaining = {
            let mut inner = self.inner.lock();
            if Self::owns(&inner.clients, client) {
                inner.clients.remove(&client.id());
                Some(inner.clients.values().cloned().collect::<Vec<_>>())
            } else {
                None
            }
        };

        match remaining {
            Some(remaining) => {
                self.depart(client, &remaining);
                true
            }
            None => {
                client.close();
                false
            }
        }
    }

    /// Add `amount` warnings to a registered client.
    ///
    /// Runs under the registry lock: a client that is gone is left alone,
    /// and the call that reaches the threshold removes the client before
    /// the lock is released, so no later call can count past it.
    pub(crate) fn strike(&self, client: &Arc<Client>, amount: u32) -> Strike {
        let mut inner = self.inner.lock();
        if !Self::owns(&inner.clients, client) {
            return Strike::Unregistered;
        }

        let (before, count) = client.add_warnings(amount);
        let threshold = client.warning_threshold();
        if before < threshold && count >= threshold {
            inner.clients.remove(&client.id());
            return Strike::Expelled {
                count,
                remaining: inner.clients.values().cloned().collect(),
            };
        }
        Strike::Counted { count }
    }

    /// Close a client already removed from the map and tell the rest.
    pub(crate) fn depart(&self, client: &Client, remaining: &[Arc<Client>]) {
        client.close();

        info!(id = client.id(), name = %client.name(), addr = %client.addr(), "Client disconnected");
        self.router.global_server_notice(
            remaining,
            &format!(
                "{} has disconnected. Online users: {}",
                client.identity(),
                remaining.len()
            ),
        );
    }

    fn owns(clients: &BTreeMap<ClientId, Arc<Client>>, client: &Arc<Client>) -> bool {
        clients
            .get(&client.id())
            .is_some_and(|current| Arc::ptr_eq(current, client))
    }

    /// Notify and drop every connection, then wait for their queued output
    /// to flush. Later registrations are refused.
    pub async fn shutdown(&self) {
        let clients = {
            let mut inner = self.inner.lock();
            self.shutdown.cancel();
            std::mem::take(&mut inner.clients)
        };
        let clients: Vec<_> = clients.into_values().collect();

        info!(population = clients.len(), "Shutting down registry");
        self.router.global_server_notice(&clients, SHUTDOWN_NOTICE);
        for client in &clients {
            client.close();
        }

        self.writers.close();
        if tokio::time::timeout(SHUTDOWN_FLUSH_TIMEOUT, self.writers.wait())
            .await
            .is_err()
        {
            warn!(pending = self.writers.len(), "Writers did not flush before timeout");
        }
    }

    /// Hold shutdown's flush wait open until a writer is spawned.
    ///
    /// Taken before `register`, so a shutdown that races the handshake
    /// still waits for the new connection's queued lines.
    pub fn writer_token(&self) -> TaskTrackerToken {
        self.writers.token()
    }

    /// Run a connection's writer task under the shutdown tracker.
    pub fn spawn_writer<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.writers.spawn(task);
    }
}

fn welcome_lines(client: &Client) -> [String; 4] {
    [
        format!(
            "Welcome to the server, {}! Your id is {}.",
            client.name(),
            client.id()
        ),
        "Type \"/serverpop\" to view the population of the server.".to_string(),
        "Type \"/pm <id> <message>\" to send a private message.".to_string(),
        "Type \"exit\" to leave.".to_string(),
    ]
}
