//! Tokenization: the token stream and the engine that fills it

pub mod engine;
pub mod stream;

use crate::grammar::{GrammarId, GrammarStore};
use crate::token::TokenNode;

pub use engine::Tokenizer;
pub use stream::{NodeId, TokenStream};

/// Tokenize `text` with the grammar `grammar` from `store`.
pub fn tokenize(store: &GrammarStore, text: &str, grammar: GrammarId) -> Vec<TokenNode> {
    Tokenizer::new(store).tokenize(text, grammar)
}
