//! # relay-proto
//!
//! Wire protocol for the line-oriented chat relay.
//!
//! Everything on the wire is a `\n`-terminated UTF-8 line. This crate holds
//! the pieces both ends agree on:
//!
//! - [`LineCodec`] for framing over tokio transports
//! - [`Handshake`] lines exchanged while a name is negotiated
//! - [`ClientCommand`] classification of client input
//! - [`format`] builders for every server-to-client message shape
//! - [`Session`] connection setup for client programs
//!
//! ## Parsing client input
//!
//! ```rust
//! use relay_proto::ClientCommand;
//!
//! match ClientCommand::parse("/pm 4 see you later") {
//!     ClientCommand::PrivateMessage { target, text } => {
//!         assert_eq!(target, "4");
//!         assert_eq!(text, "see you later");
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! ## Handshake lines
//!
//! ```rust
//! use relay_proto::Handshake;
//!
//! let line: Handshake = "1 Anonymous 2".parse().unwrap();
//! assert_eq!(line, Handshake::Accepted("Anonymous 2".into()));
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod command;
pub mod error;
pub mod format;
pub mod handshake;
pub mod line;
pub mod session;

pub use self::command::ClientCommand;
pub use self::error::{ProtocolError, SessionError};
pub use self::format::ChatLine;
pub use self::handshake::Handshake;
pub use self::line::LineCodec;
pub use self::session::{FixedName, LineReader, LineWriter, NameSource, Session, connect, framed};
