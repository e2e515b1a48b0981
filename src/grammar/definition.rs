//! Declarative grammar definitions
//!
//! [`GrammarDef`] is the uncompiled form of a grammar. It can be built in code
//! with the builder methods or deserialized from JSON/YAML. The file format is
//! an object whose keys are token kinds, in priority order:
//!
//! ```text
//! {
//!   "comment": { "pattern": "(^|[^\\\\])#.*", "lookbehind": true, "greedy": true },
//!   "string": [ "\"[^\"]*\"", { "pattern": "'[^']*'", "alias": "char" } ],
//!   "tag": { "pattern": "<[^>]+>", "inside": { "punctuation": "[<>]" } },
//!   "rest": "clike"
//! }
//! ```
//!
//! A rule is a pattern source, a pattern object or a list of those. `inside`
//! is either a language name or an inline grammar. The `rest` key names a
//! language whose rules are tried after the grammar's own.

use super::GrammarError;
use indexmap::IndexMap;
use serde::Deserialize;

/// Uncompiled grammar.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GrammarDef {
    #[serde(default)]
    pub rest: Option<String>,
    #[serde(flatten)]
    pub rules: IndexMap<String, RuleDef>,
}

/// Patterns registered under one kind.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "OneOrMany<PatternDef>")]
pub struct RuleDef(pub Vec<PatternDef>);

/// Uncompiled pattern.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "PatternRepr")]
pub struct PatternDef {
    pub pattern: String,
    pub greedy: bool,
    pub lookbehind: bool,
    pub alias: Vec<String>,
    pub inside: Option<InsideDef>,
}

/// Grammar applied to the text of a matched token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InsideDef {
    /// An already registered language (or the language being defined)
    Language(String),
    /// An anonymous grammar compiled alongside the pattern
    Grammar(Box<GrammarDef>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PatternRepr {
    Source(String),
    Full {
        pattern: String,
        #[serde(default)]
        greedy: bool,
        #[serde(default)]
        lookbehind: bool,
        #[serde(default)]
        alias: Option<OneOrMany<String>>,
        #[serde(default)]
        inside: Option<InsideDef>,
    },
}

impl From<OneOrMany<PatternDef>> for RuleDef {
    fn from(value: OneOrMany<PatternDef>) -> Self {
        RuleDef(value.into_vec())
    }
}

impl From<PatternRepr> for PatternDef {
    fn from(value: PatternRepr) -> Self {
        match value {
            PatternRepr::Source(pattern) => PatternDef::new(pattern),
            PatternRepr::Full {
                pattern,
                greedy,
                lookbehind,
                alias,
                inside,
            } => PatternDef {
                pattern,
                greedy,
                lookbehind,
                alias: alias.map(OneOrMany::into_vec).unwrap_or_default(),
                inside,
            },
        }
    }
}

impl GrammarDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Re-using a kind replaces its patterns in place.
    pub fn rule<I, P>(mut self, kind: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PatternDef>,
    {
        let patterns = patterns.into_iter().map(Into::into).collect();
        self.rules.insert(kind.into(), RuleDef(patterns));
        self
    }

    pub fn rest(mut self, language: impl Into<String>) -> Self {
        self.rest = Some(language.into());
        self
    }

    pub fn from_json(source: &str) -> Result<Self, GrammarError> {
        serde_json::from_str(source).map_err(|e| GrammarError::Definition(e.to_string()))
    }

    pub fn from_yaml(source: &str) -> Result<Self, GrammarError> {
        serde_yaml::from_str(source).map_err(|e| GrammarError::Definition(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl PatternDef {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            greedy: false,
            lookbehind: false,
            alias: Vec::new(),
            inside: None,
        }
    }

    pub fn greedy(mut self) -> Self {
        self.greedy = true;
        self
    }

    pub fn lookbehind(mut self) -> Self {
        self.lookbehind = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias.push(alias.into());
        self
    }

    pub fn inside(mut self, grammar: GrammarDef) -> Self {
        self.inside = Some(InsideDef::Grammar(Box::new(grammar)));
        self
    }

    pub fn inside_language(mut self, language: impl Into<String>) -> Self {
        self.inside = Some(InsideDef::Language(language.into()));
        self
    }
}

impl From<&str> for PatternDef {
    fn from(pattern: &str) -> Self {
        PatternDef::new(pattern)
    }
}

impl From<String> for PatternDef {
    fn from(pattern: String) -> Self {
        PatternDef::new(pattern)
    }
}
