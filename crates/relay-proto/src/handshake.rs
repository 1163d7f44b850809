//! Name-negotiation handshake lines.
//!
//! The server opens with a bare prompt (`0`), repeats it with a reason for
//! every rejected candidate (`0 <reason>`), and finishes with the accepted
//! name (`1 <name>`). The client answers each prompt with one line.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// A server-to-client handshake line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    /// Ask for a name, optionally explaining why the last one was refused.
    Prompt(Option<String>),
    /// Negotiation finished; carries the name the server registered.
    Accepted(String),
}

impl fmt::Display for Handshake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt(None) => f.write_str("0"),
            Self::Prompt(Some(reason)) => write!(f, "0 {reason}"),
            Self::Accepted(name) => write!(f, "1 {name}"),
        }
    }
}

impl FromStr for Handshake {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (code, rest) = match line.split_once(' ') {
            Some((code, rest)) => (code, Some(rest)),
            None => (line, None),
        };

        match (code, rest) {
            ("0", None) => Ok(Self::Prompt(None)),
            ("0", Some(reason)) if reason.trim().is_empty() => Ok(Self::Prompt(None)),
            ("0", Some(reason)) => Ok(Self::Prompt(Some(reason.to_string()))),
            ("1", Some(name)) if !name.is_empty() => Ok(Self::Accepted(name.to_string())),
            _ => Err(ProtocolError::MalformedHandshake(line.to_string())),
        }
    }
}
