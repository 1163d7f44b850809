//! Client command grammar.
//!
//! Every line a registered client sends is one of: an empty line, the exit
//! word, a `/pm`, a bare `/serverpop`, or plain chat. Command words match
//! case-insensitively.

/// Word that ends a session.
pub const EXIT_COMMAND: &str = "exit";
/// Private-message command prefix.
pub const PM_COMMAND: &str = "/pm";
/// Population query command.
pub const POPULATION_COMMAND: &str = "/serverpop";

/// A classified client line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand<'a> {
    /// Nothing but whitespace.
    Empty,
    /// `exit`, any case.
    Exit,
    /// `/pm` without both an id and a message.
    Incomplete,
    /// `/pm <target> <text...>`. The target is unparsed so the caller can
    /// report a bad id.
    PrivateMessage {
        /// Recipient id as typed.
        target: &'a str,
        /// Message body, words joined by single spaces.
        text: String,
    },
    /// `/serverpop` alone on the line.
    Population,
    /// Anything else, trimmed.
    Chat(&'a str),
}

impl<'a> ClientCommand<'a> {
    /// Classify one line of client input.
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if line.eq_ignore_ascii_case(EXIT_COMMAND) {
            return Self::Exit;
        }
        if line.eq_ignore_ascii_case(POPULATION_COMMAND) {
            return Self::Population;
        }

        let mut words = line.split_whitespace();
        let first = words.next().unwrap_or_default();

        if first.eq_ignore_ascii_case(PM_COMMAND) {
            let Some(target) = words.next() else {
                return Self::Incomplete;
            };
            let text = words.collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return Self::Incomplete;
            }
            return Self::PrivateMessage { target, text };
        }

        Self::Chat(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_exit() {
        assert_eq!(ClientCommand::parse("   "), ClientCommand::Empty);
        assert_eq!(ClientCommand::parse(""), ClientCommand::Empty);
        assert_eq!(ClientCommand::parse(" EXIT "), ClientCommand::Exit);
        assert_eq!(ClientCommand::parse("Exit"), ClientCommand::Exit);
        assert_eq!(
            ClientCommand::parse("exit now"),
            ClientCommand::Chat("exit now")
        );
    }

    #[test]
    fn test_private_message() {
        assert_eq!(
            ClientCommand::parse("/pm 3 hello   there"),
            ClientCommand::PrivateMessage {
                target: "3",
                text: "hello there".into()
            }
        );
        assert_eq!(
            ClientCommand::parse("/PM bob hi"),
            ClientCommand::PrivateMessage {
                target: "bob",
                text: "hi".into()
            }
        );
    }

    #[test]
    fn test_incomplete_private_message() {
        assert_eq!(ClientCommand::parse("/pm"), ClientCommand::Incomplete);
        assert_eq!(ClientCommand::parse("/pm 3"), ClientCommand::Incomplete);
        assert_eq!(ClientCommand::parse("/pm 3   "), ClientCommand::Incomplete);
    }

    #[test]
    fn test_population() {
        assert_eq!(ClientCommand::parse("/serverpop"), ClientCommand::Population);
        assert_eq!(ClientCommand::parse(" /ServerPop "), ClientCommand::Population);
        assert_eq!(
            ClientCommand::parse("/serverpop please"),
            ClientCommand::Chat("/serverpop please")
        );
    }

    #[test]
    fn test_chat_is_trimmed() {
        assert_eq!(
            ClientCommand::parse("  hello world \r"),
            ClientCommand::Chat("hello world")
        );
        assert_eq!(
            ClientCommand::parse("/unknown thing"),
            ClientCommand::Chat("/unknown thing")
        );
    }
}
