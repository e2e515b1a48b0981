//! C-like base grammar, the common ground `javascript` extends

use super::QUOTED_STRING;
use crate::grammar::{GrammarDef, GrammarError, GrammarStore, PatternDef};

const BLOCK_COMMENT: &str = r"(^|[^\\])/\*[\s\S]*?(?:\*/|$)";
const LINE_COMMENT: &str = r"(^|[^\\:])//.*";

pub fn register(store: &mut GrammarStore) -> Result<(), GrammarError> {
    let def = GrammarDef::new()
        .rule(
            "comment",
            [
                PatternDef::new(BLOCK_COMMENT).lookbehind().greedy(),
                PatternDef::new(LINE_COMMENT).lookbehind().greedy(),
            ],
        )
        .rule("string", [PatternDef::new(QUOTED_STRING).greedy()])
        .rule(
            "class-name",
            [PatternDef::new(
                r"(?i)(\b(?:class|extends|implements|instanceof|interface|new|trait)\s+|\bcatch\s+\()[\w.\\]+",
            )
            .lookbehind()
            .inside(GrammarDef::new().rule("punctuation", [r"[.\\]"]))],
        )
        .rule(
            "keyword",
            [r"\b(?:break|catch|continue|do|else|finally|for|function|if|in|instanceof|new|null|return|throw|try|while)\b"],
        )
        .rule("boolean", [r"\b(?:false|true)\b"])
        .rule("function", [r"\b\w+(?=\()"])
        .rule(
            "number",
            [r"(?i)\b0x[\da-f]+\b|(?:\b\d+(?:\.\d*)?|\B\.\d+)(?:e[+-]?\d+)?"],
        )
        .rule("operator", [r"[<>]=?|[!=]=?=?|--?|\+\+?|&&?|\|\|?|[?*/~^%]"])
        .rule("punctuation", [r"[{}\[\];(),.:]"]);

    store.define("clike", def)?;
    Ok(())
}
