//! Token tree produced by the tokenizer
//!
//! A token tree is an ordered sequence of [`TokenNode`]s. Each node is either a
//! raw, unclassified text fragment or a [`Token`]. A token's content is either
//! its matched text or, when its pattern declared an `inside` grammar, a nested
//! sequence of nodes. Concatenating the text of every node always yields the
//! tokenized input.

use serde::Serialize;

/// One element of a token tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TokenNode {
    /// Unclassified text
    Text(String),
    /// Classified span
    Token(Token),
}

/// Content of a token: matched text or a nested token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TokenContent {
    Text(String),
    Nested(Vec<TokenNode>),
}

/// A classified span of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Rule name that produced this token (e.g. "comment", "attr-value")
    #[serde(rename = "type")]
    pub kind: String,
    pub content: TokenContent,
    /// Extra classes appended after the kind when rendering
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<String>,
    /// Length in bytes of the matched text
    pub length: usize,
}

impl Token {
    pub fn new(
        kind: impl Into<String>,
        content: TokenContent,
        alias: Vec<String>,
        length: usize,
    ) -> Self {
        Self {
            kind: kind.into(),
            content,
            alias,
            length,
        }
    }

    /// The source text this token covers.
    pub fn text(&self) -> String {
        match &self.content {
            TokenContent::Text(text) => text.clone(),
            TokenContent::Nested(nodes) => flatten_text(nodes),
        }
    }

    /// Nested children, if this token was tokenized with an inside grammar.
    pub fn children(&self) -> Option<&[TokenNode]> {
        match &self.content {
            TokenContent::Nested(nodes) => Some(nodes),
            TokenContent::Text(_) => None,
        }
    }
}

impl TokenNode {
    /// Length in bytes of the source text covered by this node.
    pub fn len(&self) -> usize {
        match self {
            TokenNode::Text(text) => text.len(),
            TokenNode::Token(token) => token.length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            TokenNode::Token(token) => Some(token),
            TokenNode::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TokenNode::Text(text) => Some(text),
            TokenNode::Token(_) => None,
        }
    }

    pub fn is_token(&self) -> bool {
        matches!(self, TokenNode::Token(_))
    }
}

/// Concatenate the source text of a token tree.
pub fn flatten_text(nodes: &[TokenNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            TokenNode::Text(text) => out.push_str(text),
            TokenNode::Token(token) => out.push_str(&token.text()),
        }
    }
    out
}
