//! Operator console.
//!
//! Reads one command per line from an async reader (stdin in production)
//! and acts on the registry. Every reply goes to the console output through
//! the router's admin sink.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, instrument, warn};

use crate::state::{Client, ClientId, Registry, USER_NOT_FOUND};

const APM_USAGE: &str = "Incorrect usage of /apm. Correct usage is \"/apm <id> <message>\".";
const WARN_USAGE: &str =
    "Incorrect usage of /warn. Correct usage is \"/warn <id> [points] <reason>\".";
const DEFAULT_WARN_REASON: &str = "No reason given";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand<'a> {
    Empty,
    /// `/apm <id> <text...>`
    PrivateMessage { target: &'a str, text: String },
    /// `/warn <id> [points] [reason...]`
    Warn {
        target: &'a str,
        amount: i64,
        reason: String,
    },
    /// `/getlist`
    List,
    /// `/servershutdown`
    Shutdown,
    /// A known command with missing arguments.
    Usage(&'static str),
    /// An unrecognized `/word`.
    Unknown(&'a str),
    /// Anything not starting with `/`.
    Broadcast(&'a str),
}

impl<'a> AdminCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if !line.starts_with('/') {
            return Self::Broadcast(line);
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();

        match command.to_ascii_lowercase().as_str() {
            "/apm" => {
                let Some(target) = words.next() else {
                    return Self::Usage(APM_USAGE);
                };
                let text = words.collect::<Vec<_>>().join(" ");
                if text.is_empty() {
                    return Self::Usage(APM_USAGE);
                }
                Self::PrivateMessage { target, text }
            }
            "/warn" => {
                let Some(target) = words.next() else {
                    return Self::Usage(WARN_USAGE);
                };
                let rest: Vec<&str> = words.collect();
                let (amount, reason) = match rest.split_first() {
                    Some((first, tail)) => match first.parse::<i64>() {
                        Ok(amount) => (amount, tail.join(" ")),
                        Err(_) => (1, rest.join(" ")),
                    },
                    None => (1, String::new()),
                };
                let reason = if reason.is_empty() {
                    DEFAULT_WARN_REASON.to_string()
                } else {
                    reason
                };
                Self::Warn {
                    target,
                    amount,
                    reason,
                }
            }
            "/getlist" => Self::List,
            "/servershutdown" => Self::Shutdown,
            _ => Self::Unknown(command),
        }
    }
}

/// How the console loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// `/servershutdown` ran; the registry is shut down.
    Shutdown,
    /// Input reached end of file or failed; the server keeps running.
    InputClosed,
}

/// The operator console.
pub struct AdminConsole {
    registry: Arc<Registry>,
}

impl AdminConsole {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Process console lines until shutdown or end of input.
    #[instrument(skip_all, name = "console")]
    pub async fn run<R>(&self, input: R) -> ConsoleExit
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if self.execute(AdminCommand::parse(&line)) {
                        info!("Shutdown requested from console");
                        self.registry.shutdown().await;
                        return ConsoleExit::Shutdown;
                    }
                }
                Ok(None) => {
                    info!("Console input closed; server keeps running");
                    return ConsoleExit::InputClosed;
                }
                Err(e) => {
                    warn!(error = %e, "Console read failed; disabling console");
                    return ConsoleExit::InputClosed;
                }
            }
        }
    }

    /// Act on one command. Returns `true` when shutdown was requested.
    pub fn execute(&self, command: AdminCommand<'_>) -> bool {
        let router = self.registry.router();

        match command {
            AdminCommand::Empty => {}
            AdminCommand::PrivateMessage { target, text } => {
                if let Some(client) = self.resolve(target) {
                    router.admin_private_message(&client, &text);
                }
            }
            AdminCommand::Warn {
                target,
                amount,
                reason,
            } => {
                if let Some(client) = self.resolve(target) {
                    self.registry.warn(&client, amount, &reason);
                }
            }
            AdminCommand::List => {
                let clients = self.registry.snapshot();
                router.to_admin(format!("Server population: {}", clients.len()));
                for client in &clients {
                    router.to_admin(client.identity());
                }
            }
            AdminCommand::Shutdown => return true,
            AdminCommand::Usage(usage) => router.to_admin(usage),
            AdminCommand::Unknown(word) => router.to_admin(format!("Command not found: {word}")),
            AdminCommand::Broadcast(text) => {
                router.admin_broadcast(&self.registry.snapshot(), text);
            }
        }
        false
    }

    /// Look up a live client by id token, reporting failures to the console.
    fn resolve(&self, token: &str) -> Option<Arc<Client>> {
        let router = self.registry.router();
        let Ok(id) = token.parse::<ClientId>() else {
            router.to_admin(format!("Invalid id: {token}."));
            return None;
        };
        let client = self.registry.get(id);
        if client.is_none() {
            router.to_admin(USER_NOT_FOUND);
        }
        client
    }
}
