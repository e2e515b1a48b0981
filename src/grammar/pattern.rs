//! Compiled patterns
//!
//! A [`Pattern`] wraps one regular expression together with the metadata the
//! tokenizer needs: greedy scanning, lookbehind trimming, alias classes and an
//! optional nested grammar. Patterns use `fancy-regex` so grammars can rely on
//! lookaround and back references.

use super::{GrammarError, GrammarId};
use fancy_regex::Regex;

/// How the tokenizer feeds text to a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Match only inside the current unclassified fragment
    Fragment,
    /// Match against the whole input from the running offset, possibly
    /// covering several stream nodes
    Input,
}

/// A compiled matching rule.
#[derive(Debug)]
pub struct Pattern {
    source: String,
    regex: Regex,
    scan: ScanMode,
    lookbehind: bool,
    alias: Vec<String>,
    inside: Option<GrammarId>,
}

/// A successful match, already adjusted for lookbehind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'t> {
    /// Byte offset of the match in the searched text
    pub index: usize,
    /// Matched text
    pub text: &'t str,
    /// Capture groups 1.., `None` for groups that did not participate
    pub groups: Vec<Option<&'t str>>,
}

impl PatternMatch<'_> {
    pub fn end(&self) -> usize {
        self.index + self.text.len()
    }
}

impl Pattern {
    /// Compile a plain, non-greedy pattern.
    pub fn new(source: &str) -> Result<Self, GrammarError> {
        let regex = Regex::new(source).map_err(|e| GrammarError::InvalidPattern {
            kind: String::new(),
            pattern: source.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
            scan: ScanMode::Fragment,
            lookbehind: false,
            alias: Vec::new(),
            inside: None,
        })
    }

    pub fn with_greedy(mut self, greedy: bool) -> Self {
        self.scan = if greedy {
            ScanMode::Input
        } else {
            ScanMode::Fragment
        };
        self
    }

    pub fn with_lookbehind(mut self, lookbehind: bool) -> Self {
        self.lookbehind = lookbehind;
        self
    }

    pub fn with_alias(mut self, alias: Vec<String>) -> Self {
        self.alias = alias;
        self
    }

    pub fn with_inside(mut self, inside: Option<GrammarId>) -> Self {
        self.inside = inside;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan
    }

    pub fn is_greedy(&self) -> bool {
        self.scan == ScanMode::Input
    }

    pub fn is_lookbehind(&self) -> bool {
        self.lookbehind
    }

    pub fn alias(&self) -> &[String] {
        &self.alias
    }

    pub fn inside(&self) -> Option<GrammarId> {
        self.inside
    }

    /// Find the first match in `text` at or after byte offset `pos`.
    ///
    /// Anchors and lookbehinds see the text before `pos`. For lookbehind
    /// patterns a non-empty first group is trimmed off the front of the match.
    pub fn find<'t>(&self, text: &'t str, pos: usize) -> Option<PatternMatch<'t>> {
        let captures = match self.regex.captures_from_pos(text, pos) {
            Ok(Some(captures)) => captures,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(pattern = %self.source, %error, "pattern failed while matching");
                return None;
            }
        };
        let whole = captures.get(0)?;
        let groups: Vec<Option<&'t str>> = (1..captures.len())
            .map(|i| captures.get(i).map(|m| m.as_str()))
            .collect();

        let mut index = whole.start();
        let mut matched = whole.as_str();
        if self.lookbehind {
            if let Some(Some(prefix)) = groups.first() {
                index += prefix.len();
                matched = &matched[prefix.len()..];
            }
        }

        Some(PatternMatch {
            index,
            text: matched,
            groups,
        })
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.scan == other.scan
            && self.lookbehind == other.lookbehind
            && self.alias == other.alias
            && self.inside == other.inside
    }
}

impl Eq for Pattern {}
