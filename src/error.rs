//! Unified error handling for relayd.
//!
//! Each layer gets its own enum; lower layers convert upward with `#[from]`.

use crate::state::ClientId;
use relay_proto::ProtocolError;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Name negotiation
// ============================================================================

/// Reasons a candidate display name is refused.
///
/// The `Display` text is sent to the client verbatim in the re-prompt line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Name must be between {min} and {max} characters long.")]
    Length { min: usize, max: usize },

    #[error("Name must not contain \"{0}\".")]
    Reserved(String),

    #[error("Name \"{0}\" is already taken.")]
    Taken(String),

    #[error("Server is shutting down.")]
    ShuttingDown,
}

impl NameError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Length { .. } => "name_length",
            Self::Reserved(_) => "name_reserved",
            Self::Taken(_) => "name_taken",
            Self::ShuttingDown => "shutting_down",
        }
    }
}

// ============================================================================
// Delivery
// ============================================================================

/// A line could not be queued for a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("connection {0} is closed")]
    Closed(ClientId),
    /// The peer is not reading; the connection has been closed.
    #[error("connection {0} send queue exceeded")]
    QueueFull(ClientId),
}

// ============================================================================
// Connection setup
// ============================================================================

/// Failures while negotiating a name on a fresh transport.
///
/// None of these are fatal to the server; the transport is dropped.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("peer closed the connection before choosing a name")]
    Closed,

    #[error("server is shutting down")]
    ShuttingDown,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl HandshakeError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::ShuttingDown => "shutting_down",
            Self::Protocol(ProtocolError::Io(_)) => "io_error",
            Self::Protocol(_) => "protocol_error",
        }
    }
}

// ============================================================================
// Startup
// ============================================================================

/// The moderation word list could not be loaded.
#[derive(Debug, Error)]
pub enum WordListError {
    #[error("failed to read word list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build word matcher: {0}")]
    Build(#[from] aho_corasick::BuildError),
}

/// No candidate port could be bound.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("could not bind {host} on any of ports {tried:?}")]
    Exhausted { host: String, tried: Vec<u16> },
}
