//! # glint
//!
//! A grammar-driven tokenizer and markup highlighter.
//!
//! A grammar is an ordered set of token rules (see [`grammar`]). The
//! [`tokenizer`] applies a grammar to raw text and produces a token tree
//! ([`token`]), which the [`render`] module turns into
//! `<span class="token kind">` markup. [`highlight::Highlighter`] wraps the
//! whole pipeline together with the built-in [`languages`], the
//! [`hooks`] and the [`config`] layer.
//!
//! ```text
//! let highlighter = Highlighter::new()?;
//! let html = highlighter.highlight_language("let x = 1;", "js");
//! ```

pub mod config;
pub mod grammar;
pub mod highlight;
pub mod hooks;
pub mod languages;
pub mod render;
pub mod token;
pub mod tokenizer;

pub use grammar::{GrammarDef, GrammarError, GrammarId, GrammarStore, PatternDef};
pub use highlight::{CodeElement, HighlightError, HighlightedElement, Highlighter};
pub use token::{Token, TokenContent, TokenNode};
