//! Command-line flags shared by the relay binaries.
//!
//! Flags are single-dash words followed by one value (`-ccp 14002`). Bad
//! input never aborts: a missing or unparsable value keeps the default and
//! an unknown flag is skipped, each with a logged warning.

use tracing::warn;

/// Host a client dials when none is given.
pub const DEFAULT_HOST: &str = "localhost";
/// Port the server binds and clients dial first.
pub const DEFAULT_PORT: u16 = 14001;
/// Fallback ports tried in order when the preferred one is unavailable.
pub const PORT_POOL: [u16; 10] = [
    14001, 14002, 14003, 14004, 14005, 14006, 14007, 14008, 14009, 14010,
];
/// Name the bot registers with by default.
pub const DEFAULT_BOT_NAME: &str = "ChatBot";

/// Group raw arguments into `(flag, value)` pairs.
///
/// A trailing flag without a value yields `None`. Words that do not start
/// with `-` where a flag is expected are reported and skipped.
pub fn flag_pairs<I>(args: I) -> Vec<(String, Option<String>)>
where
    I: IntoIterator<Item = String>,
{
    let mut pairs = Vec::new();
    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        if !flag.starts_with('-') {
            warn!(arg = %flag, "Ignoring stray argument");
            continue;
        }
        pairs.push((flag, args.next()));
    }
    pairs
}

/// Parse a port value, warning and returning `None` when it is unusable.
pub fn parse_port(flag: &str, value: Option<&str>) -> Option<u16> {
    let Some(value) = value else {
        warn!(flag, "Missing value, keeping default");
        return None;
    };
    match value.parse::<u16>() {
        Ok(0) | Err(_) => {
            warn!(flag, value, "Invalid port, keeping default");
            None
        }
        Ok(port) => Some(port),
    }
}

/// Options for the terminal client and the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// `-cca`
    pub host: String,
    /// `-ccp`
    pub port: u16,
    /// `-cbn`, only read by the bot.
    pub bot_name: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bot_name: DEFAULT_BOT_NAME.to_string(),
        }
    }
}

impl ClientOptions {
    /// Build options from process arguments (program name excluded).
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        for (flag, value) in flag_pairs(args) {
            match flag.as_str() {
                "-cca" => match value {
                    Some(host) if !host.trim().is_empty() => options.host = host,
                    _ => warn!(flag = %flag, "Missing address, keeping default"),
                },
                "-ccp" => {
                    if let Some(port) = parse_port(&flag, value.as_deref()) {
                        options.port = port;
                    }
                }
                "-cbn" => match value {
                    Some(name) if !name.trim().is_empty() => options.bot_name = name,
                    _ => warn!(flag = %flag, "Missing bot name, keeping default"),
                },
                _ => warn!(flag = %flag, "Unknown flag ignored"),
            }
        }
        options
    }
}
