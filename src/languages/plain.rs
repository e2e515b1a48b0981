//! Plain text: no rules, the input is only escaped.

use crate::grammar::{GrammarDef, GrammarError, GrammarStore};

pub fn register(store: &mut GrammarStore) -> Result<(), GrammarError> {
    store.define("plain", GrammarDef::new())?;
    for alias in ["plaintext", "text", "txt"] {
        store.alias(alias, "plain")?;
    }
    Ok(())
}
