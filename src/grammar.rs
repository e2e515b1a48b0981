//! Grammars: ordered token rules and the store that owns them
//!
//! A grammar maps token kinds to lists of patterns. Kind order is priority
//! order: the tokenizer applies every pattern of the first kind across the
//! whole text before it looks at the second kind.
//!
//! Grammars are described with [`GrammarDef`] (plain data, deserializable from
//! JSON or YAML) and compiled into the [`GrammarStore`], which hands out
//! [`GrammarId`] handles. Everything that refers to a grammar (language names,
//! aliases, `inside` and `rest` references) goes through a handle, so a grammar
//! rebuilt by [`GrammarStore::insert_before`] is seen by all of them at once.

pub mod definition;
pub mod pattern;
pub mod store;

use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

pub use definition::{GrammarDef, InsideDef, PatternDef, RuleDef};
pub use pattern::{Pattern, PatternMatch, ScanMode};
pub use store::{GrammarStore, Placement};

/// Handle to a grammar slot in a [`GrammarStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrammarId(pub(crate) usize);

/// Patterns registered under one token kind, in priority order. Never empty.
pub type Rule = Vec<Arc<Pattern>>;

/// A compiled grammar.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub(crate) rules: IndexMap<String, Rule>,
    pub(crate) rest: Option<GrammarId>,
}

impl Grammar {
    /// Rules in priority order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[Arc<Pattern>])> {
        self.rules.iter().map(|(kind, rule)| (kind.as_str(), rule.as_slice()))
    }

    pub fn rule(&self, kind: &str) -> Option<&[Arc<Pattern>]> {
        self.rules.get(kind).map(|rule| rule.as_slice())
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    /// Grammar whose rules are appended after this grammar's own rules.
    pub fn rest(&self) -> Option<GrammarId> {
        self.rest
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Errors raised while defining or modifying grammars
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("invalid pattern for `{kind}` ({pattern}): {message}")]
    InvalidPattern {
        kind: String,
        pattern: String,
        message: String,
    },

    #[error("rule `{0}` has no patterns")]
    EmptyRule(String),

    #[error("unknown language `{0}`")]
    UnknownLanguage(String),

    #[error("grammar has no rule named `{0}`")]
    UnknownKind(String),

    #[error("malformed grammar definition: {0}")]
    Definition(String),
}
