//! Warning escalation.

use std::sync::Arc;

use tracing::warn;

use crate::state::{Client, Registry, Strike, USER_NOT_FOUND};

/// Admin notice for a non-positive point value.
pub const INVALID_POINTS: &str = "Warning points must be at least 1.";

/// What a call to [`Registry::warn`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnOutcome {
    /// Amount below 1; nothing changed.
    Rejected,
    /// The client had already left; nothing changed.
    Gone,
    /// Count raised, still under the threshold.
    Warned { count: u32 },
    /// This call crossed the threshold and disconnected the client.
    Disconnected { count: u32 },
}

impl Registry {
    /// Add `amount` warnings to `client` and escalate at the threshold.
    ///
    /// Counting happens under the registry lock, so a warning racing a
    /// disconnect changes nothing, and of several racing warnings only the
    /// one that crosses the threshold disconnects.
    pub fn warn(&self, client: &Arc<Client>, amount: i64, reason: &str) -> WarnOutcome {
        let router = self.router();
        if amount < 1 {
            router.to_admin(INVALID_POINTS);
            return WarnOutcome::Rejected;
        }
        let amount = u32::try_from(amount).unwrap_or(u32::MAX);
        let threshold = client.warning_threshold();

        let (count, remaining) = match self.strike(client, amount) {
            Strike::Unregistered => {
                router.to_admin(USER_NOT_FOUND);
                return WarnOutcome::Gone;
            }
            Strike::Counted { count } => (count, None),
            Strike::Expelled { count, remaining } => (count, Some(remaining)),
        };

        warn!(
            id = client.id(),
            name = %client.name(),
            count,
            threshold,
            reason,
            "Client warned"
        );

        router.server_notice(client, &format!("Warning {count}/{threshold}: {reason}"));
        router.to_admin(format!(
            "{} warned ({count}/{threshold}): {reason}",
            client.identity()
        ));

        let Some(remaining) = remaining else {
            return WarnOutcome::Warned { count };
        };

        router.server_notice(
            client,
            "Maximum warnings reached. You are being disconnected.",
        );
        router.to_admin(format!(
            "{} reached the maximum number of warnings and was disconnected.",
            client.identity()
        ));
        self.depart(client, &remaining);
        WarnOutcome::Disconnected { count }
    }
}
