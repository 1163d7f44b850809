//! Server command line: `relayd [-csp <port>] [-conf <path>]`.

use relay_proto::cli::{flag_pairs, parse_port};
use std::path::PathBuf;
use tracing::warn;

/// Parsed server flags. Unset fields fall back to the config file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ServerArgs {
    /// `-csp`: overrides `listen.port`.
    pub port: Option<u16>,
    /// `-conf`: TOML config path; built-in defaults apply without it.
    pub config: Option<PathBuf>,
}

impl ServerArgs {
    /// Parse process arguments (program name excluded).
    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        for (flag, value) in flag_pairs(args) {
            match flag.as_str() {
                "-csp" => {
                    if let Some(port) = parse_port(&flag, value.as_deref()) {
                        parsed.port = Some(port);
                    }
                }
                "-conf" => match value {
                    Some(path) => parsed.config = Some(PathBuf::from(path)),
                    None => warn!(flag = %flag, "Missing config path, using defaults"),
                },
                _ => warn!(flag = %flag, "Unknown argument"),
            }
        }
        parsed
    }
}
