//! Message formatting for server-to-client lines.
//!
//! All routing paths build their text through these helpers so clients,
//! the bot, and the admin console see one consistent layout.

use std::fmt;

/// Tag on server-originated notices.
pub const SERVER_TAG: &str = "[SERVER]";
/// Tag on admin-originated broadcasts.
pub const ADMIN_TAG: &str = "[ADMIN]";
/// Tag on admin private messages.
pub const ADMIN_PM_TAG: &str = "[Admin PM]";
/// Tag on peer-to-peer private messages.
pub const PM_TAG: &str = "[PM]";

/// Public identity of a connection: `name(id)`.
pub fn identity(name: &str, id: u64) -> String {
    format!("{name}({id})")
}

/// A chat line broadcast on behalf of a client: `[id] name: text`.
pub fn client_line(id: u64, name: &str, text: &str) -> String {
    ChatLine {
        id,
        name: name.to_string(),
        text: text.to_string(),
    }
    .to_string()
}

/// `[SERVER]: text`
pub fn server_notice(text: &str) -> String {
    format!("{SERVER_TAG}: {text}")
}

/// `[ADMIN]: text`
pub fn admin_broadcast(text: &str) -> String {
    format!("{ADMIN_TAG}: {text}")
}

/// `[Admin PM] [ADMIN] -> target: text`
pub fn admin_private(target_name: &str, text: &str) -> String {
    format!("{ADMIN_PM_TAG} {ADMIN_TAG} -> {target_name}: {text}")
}

/// `[PM] source -> target: text`, both sides as public identities.
pub fn private_message(source_identity: &str, target_identity: &str, text: &str) -> String {
    format!("{PM_TAG} {source_identity} -> {target_identity}: {text}")
}

/// A parsed client broadcast line.
///
/// Only client broadcasts have this shape; tagged notices (`[SERVER]`,
/// `[ADMIN]`, `[PM]`) never parse because their bracket does not hold a
/// number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Sender id.
    pub id: u64,
    /// Sender display name.
    pub name: String,
    /// Message body.
    pub text: String,
}

impl ChatLine {
    /// Parse `[id] name: text`. Names may contain spaces (`Anonymous 3`) but
    /// never `": "`, so the first such separator ends the name.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('[')?;
        let (id, rest) = rest.split_once("] ")?;
        let id = id.parse().ok()?;
        let (name, text) = rest.split_once(": ")?;
        if name.is_empty() {
            return None;
        }
        Some(Self {
            id,
            name: name.to_string(),
            text: text.to_string(),
        })
    }
}

impl fmt::Display for ChatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.id, self.name, self.text)
    }
}
