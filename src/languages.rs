//! Built-in language grammars
//!
//! Registration order matters: later languages reference earlier ones by name
//! (`javascript` extends `clike`) or splice rules into them (`css` and
//! `javascript` add embedded `<style>`/`<script>` rules to `markup`).

pub mod clike;
pub mod css;
pub mod javascript;
pub mod json;
pub mod markup;
pub mod plain;

use crate::grammar::{GrammarError, GrammarStore};

/// Quoted string with backslash escapes, shared by several grammars
pub(crate) const QUOTED_STRING: &str =
    r#""(?:\\(?:\r\n|[\s\S])|[^"\\\r\n])*"|'(?:\\(?:\r\n|[\s\S])|[^'\\\r\n])*'"#;

/// Register every built-in language, with its aliases.
pub fn register_builtins(store: &mut GrammarStore) -> Result<(), GrammarError> {
    plain::register(store)?;
    markup::register(store)?;
    css::register(store)?;
    clike::register(store)?;
    javascript::register(store)?;
    json::register(store)?;
    tracing::debug!(languages = store.languages().count(), "registered built-in languages");
    Ok(())
}
