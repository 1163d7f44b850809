//! Bad-word list loading and matching.
//!
//! The list file holds one word per line. If any line starts with the
//! section marker, only the lines between the first marker and the next one
//! are words, which lets the file carry a header and trailer.

use std::collections::BTreeSet;
use std::path::Path;

use aho_corasick::{AhoCorasick, MatchKind};
use tracing::info;

use crate::error::WordListError;

/// Immutable set of lowercase bad words with a prebuilt matcher.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
    /// Aho-Corasick automaton over `words`, pattern ids index into it.
    matcher: AhoCorasick,
}

impl WordList {
    /// Read and parse the list file.
    pub fn load(
        path: impl AsRef<Path>,
        section_marker: &str,
        min_word_length: usize,
    ) -> Result<Self, WordListError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| WordListError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let list = Self::parse(&content, section_marker, min_word_length)?;
        info!(path = %path.display(), words = list.len(), "Loaded word list");
        Ok(list)
    }

    /// Parse list file content.
    pub fn parse(
        content: &str,
        section_marker: &str,
        min_word_length: usize,
    ) -> Result<Self, WordListError> {
        let marked = !section_marker.is_empty()
            && content.lines().any(|l| l.starts_with(section_marker));

        let lines: Box<dyn Iterator<Item = &str> + '_> = if marked {
            Box::new(
                content
                    .lines()
                    .skip_while(move |l| !l.starts_with(section_marker))
                    .skip(1)
                    .take_while(move |l| !l.starts_with(section_marker)),
            )
        } else {
            Box::new(content.lines())
        };

        Self::from_words(lines, min_word_length)
    }

    /// Build from raw words: trimmed, lowercased, short ones dropped,
    /// duplicates collapsed.
    pub fn from_words<I, S>(words: I, min_word_length: usize) -> Result<Self, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty() && w.chars().count() >= min_word_length)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostFirst)
            .build(&words)?;

        Ok(Self { words, matcher })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// First bad word contained anywhere in `line`, ignoring case.
    pub fn find(&self, line: &str) -> Option<&str> {
        let lowered = line.to_lowercase();
        self.matcher
            .find(&lowered)
            .map(|m| self.words[m.pattern().as_usize()].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MARKER: &str = "-----------";

    #[test]
    fn test_unmarked_file_uses_every_line() {
        let list = WordList::parse("darn\nHeck\n\nno\n", MARKER, 3).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.find("what the HECK"), Some("heck"));
        assert_eq!(list.find("no problem"), None);
    }

    #[test]
    fn test_marked_section_only() {
        let content = "List of words\nsource: somewhere\n-----------\nfoo\nbarbaz\n----------- end\ntrailer\n";
        let list = WordList::parse(content, MARKER, 3).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.find("the trailer"), None);
        assert_eq!(list.find("the list"), None);
        assert_eq!(list.find("FooBar"), Some("foo"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let list = WordList::from_words(["Darn", "darn ", "DARN"], 3).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_substring_containment() {
        let list = WordList::from_words(["ass"], 3).unwrap();
        assert_eq!(list.find("classic"), Some("ass"));
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let list = WordList::from_words(Vec::<String>::new(), 3).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.find("anything"), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "header\n-----------\nblast\nzap\n-----------").unwrap();

        let list = WordList::load(file.path(), MARKER, 3).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.find("ZAP!"), Some("zap"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = WordList::load("/no/such/words.txt", MARKER, 3).unwrap_err();
        assert!(matches!(err, WordListError::Io { .. }));
        assert!(err.to_string().contains("/no/such/words.txt"));
    }
}
