//! Ignore patterns.
//!
//! Patterns suppress file paths or line content from being counted as
//! meaningful changes. An entry is either a literal substring or, when it
//! starts with `regex:`, a regular expression that only has to match
//! somewhere in the text (search, not full match).

use regex::Regex;

use crate::error::{Error, Result};

/// Prefix that marks a pattern entry as a regular expression.
pub const REGEX_PREFIX: &str = "regex:";

/// A single compiled ignore pattern.
#[derive(Clone, Debug)]
pub enum IgnorePattern {
    /// Matches when the text contains the substring.
    Literal(String),
    /// Matches when the expression finds a match anywhere in the text.
    Regex(Regex),
}

impl IgnorePattern {
    /// Compile one pattern entry.
    pub fn compile(entry: &str) -> Result<Self> {
        match entry.strip_prefix(REGEX_PREFIX) {
            Some(expr) => Regex::new(expr)
                .map(IgnorePattern::Regex)
                .map_err(|source| Error::InvalidPattern {
                    pattern: entry.to_string(),
                    source,
                }),
            None => Ok(IgnorePattern::Literal(entry.to_string())),
        }
    }

    /// Check whether the pattern matches the text.
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            IgnorePattern::Literal(literal) => text.contains(literal.as_str()),
            IgnorePattern::Regex(regex) => regex.is_match(text),
        }
    }

    /// Pattern text as it would be written in configuration.
    pub fn source(&self) -> String {
        match self {
            IgnorePattern::Literal(literal) => literal.clone(),
            IgnorePattern::Regex(regex) => format!("{}{}", REGEX_PREFIX, regex.as_str()),
        }
    }
}

/// An ordered, read-only list of ignore patterns.
///
/// Compiled once per analysis and shared across threads while files are
/// classified.
#[derive(Clone, Debug, Default)]
pub struct PatternSet {
    patterns: Vec<IgnorePattern>,
}

impl PatternSet {
    /// An empty set that never matches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a newline-separated pattern list.
    ///
    /// Entries are trimmed and blank entries are skipped. The first invalid
    /// regular expression aborts parsing.
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_entries(text.lines())
    }

    /// Compile pattern entries from any iterator of strings.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = entries
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref().trim();
                (!entry.is_empty()).then(|| IgnorePattern::compile(entry))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Check whether any pattern matches the text.
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    /// Return the first matching pattern, if any.
    pub fn find(&self, text: &str) -> Option<&IgnorePattern> {
        self.patterns.iter().find(|p| p.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_substring() {
        let set = PatternSet::parse("TODO").unwrap();
        assert!(set.is_match("// TODO: remove"));
        assert!(!set.is_match("// todo lowercase"));
    }

    #[test]
    fn test_regex_is_search_not_full_match() {
        let set = PatternSet::parse("regex:version=\"\\d+\"").unwrap();
        assert!(set.is_match("<dependency version=\"42\" scope=\"test\"/>"));
        assert!(!set.is_match("<dependency version=\"x\"/>"));
    }

    #[test]
    fn test_anchored_regex() {
        let set = PatternSet::parse("regex:^\\s*<!--").unwrap();
        assert!(set.is_match("<!-- comment -->"));
        assert!(!set.is_match("<a/> <!-- trailing -->"));
    }

    #[test]
    fn test_blank_entries_skipped() {
        let set = PatternSet::parse("\n  TODO  \n\r\n\nregex:^import ").unwrap();
        assert_eq!(set.len(), 2);
        // A blank entry would otherwise match every line
        assert!(!set.is_match("plain content"));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let err = PatternSet::parse("TODO\nregex:([unclosed").unwrap_err();
        match err {
            Error::InvalidPattern { pattern, .. } => assert_eq!(pattern, "regex:([unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_returns_first_match() {
        let set = PatternSet::from_entries(["foo", "regex:o+"]).unwrap();
        let hit = set.find("foo").unwrap();
        assert_eq!(hit.source(), "foo");
        assert_eq!(set.find("boo").unwrap().source(), "regex:o+");
        assert!(set.find("bar").is_none());
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = PatternSet::new();
        assert!(set.is_empty());
        assert!(!set.is_match(""));
        assert!(!set.is_match("anything"));
    }
}
