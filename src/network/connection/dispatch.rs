//! Per-line command dispatch for registered clients.

use crate::moderation::{WarnOutcome, WordList, bad_word_reason};
use crate::state::{Client, ClientId, Registry, USER_NOT_FOUND};
use relay_proto::ClientCommand;
use std::sync::Arc;
use tracing::debug;

pub(super) const PM_USAGE: &str =
    "Incorrect usage of /pm. Correct usage is \"/pm <id> <message>\".";

/// Whether the input loop keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DispatchResult {
    Continue,
    Exit,
}

/// Classify and act on one line from `client`.
pub(super) fn process_line(
    registry: &Registry,
    words: &WordList,
    client: &Arc<Client>,
    line: &str,
) -> DispatchResult {
    let router = registry.router();

    match ClientCommand::parse(line) {
        ClientCommand::Empty => {}
        ClientCommand::Incomplete => debug!(id = client.id(), "Ignoring incomplete /pm"),
        ClientCommand::Exit => return DispatchResult::Exit,
        ClientCommand::PrivateMessage { target, text } => match target.parse::<ClientId>() {
            Err(_) => router.server_notice(client, PM_USAGE),
            Ok(id) => match registry.get(id) {
                Some(target) => router.private_message(&target, client, &text),
                None => router.server_notice(client, USER_NOT_FOUND),
            },
        },
        ClientCommand::Population => {
            let clients = registry.snapshot();
            router.server_notice(client, &format!("Server population: {}", clients.len()));
            for c in &clients {
                router.server_notice(client, &c.identity());
            }
        }
        ClientCommand::Chat(text) => match words.find(text) {
            Some(word) => {
                if let WarnOutcome::Disconnected { count } =
                    registry.warn(client, 1, &bad_word_reason(word))
                {
                    debug!(id = client.id(), count, "Disconnected after bad-word warnings");
                }
            }
            None => registry.broadcast_from(client, text),
        },
    }

    DispatchResult::Continue
}
