//! Error handling utilities for connection management.
//!
//! Classifies reader faults so the input loop can log them at the right
//! level before tearing the connection down.

use relay_proto::ProtocolError;

/// Notice sent to a connection whose reader failed while it was still open.
pub(super) const READ_FAULT_NOTICE: &str = "Failed to continue process. Closing connection.";

/// Classification of transport read errors for appropriate handling.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum ReadErrorAction {
    /// Protocol violation (oversized line, invalid UTF-8) - notify and disconnect
    FatalProtocolError { error_msg: String },
    /// I/O error - connection is broken, just log and disconnect
    IoError,
}

/// Classify a transport read error into an actionable category.
pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    match e {
        ProtocolError::Io(_) => ReadErrorAction::IoError,
        ProtocolError::LineTooLong { actual, limit } => ReadErrorAction::FatalProtocolError {
            error_msg: format!("Line too long: {actual} bytes (limit {limit})"),
        },
        ProtocolError::InvalidUtf8 { byte_pos, details } => {
            ReadErrorAction::FatalProtocolError {
                error_msg: format!("Invalid UTF-8 at byte {byte_pos}: {details}"),
            }
        }
        ProtocolError::MalformedHandshake(_) => ReadErrorAction::FatalProtocolError {
            error_msg: format!("Protocol error: {e}"),
        },
    }
}
