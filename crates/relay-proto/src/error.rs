//! Error types for the relay wire protocol.
//!
//! [`ProtocolError`] covers framing and decoding failures on a single
//! transport. [`SessionError`] covers the client side of connection setup.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Framing and decoding errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// I/O error on the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the codec's maximum length.
    #[error("line too long ({actual} bytes, limit {limit})")]
    LineTooLong {
        /// Bytes buffered when the limit was hit.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A line was not valid UTF-8.
    #[error("invalid UTF-8 in line: {details}")]
    InvalidUtf8 {
        /// Byte offset of the first invalid sequence.
        byte_pos: usize,
        /// Decoder description of the failure.
        details: String,
    },

    /// A handshake line did not follow the `0 [reason]` / `1 <name>` form.
    #[error("malformed handshake line: {0:?}")]
    MalformedHandshake(String),
}

/// Errors raised while a client establishes a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No port in the candidate list accepted a connection.
    #[error("could not reach {host} on any of ports {tried:?}")]
    Unreachable {
        /// Host that was dialed.
        host: String,
        /// Ports attempted, in order.
        tried: Vec<u16>,
    },

    /// The server closed the connection before accepting a name.
    #[error("server closed the connection during name negotiation")]
    Closed,

    /// The name source gave up after a rejection.
    #[error("name rejected: {0}")]
    NameRejected(String),

    /// The name source has no more input.
    #[error("no name available")]
    NoName,

    /// Transport failure while connecting or negotiating.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The server sent something the handshake cannot accept.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
