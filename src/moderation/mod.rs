//! Moderation: bad-word detection and warning escalation.

mod warnings;
mod wordlist;

pub use warnings::WarnOutcome;
pub use wordlist::WordList;

/// Warning reason for a line that contained `word`.
pub fn bad_word_reason(word: &str) -> String {
    format!("Inappropriate word detected: {word}.")
}
