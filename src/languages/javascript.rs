//! JavaScript, plus `<script>` bodies in markup

use super::markup;
use crate::grammar::{GrammarDef, GrammarError, GrammarStore, PatternDef};

const KEYWORD: &str = r"(^|[^.]|\.\.\.\s*)\b(?:as|async|await|break|case|catch|class|const|continue|debugger|default|delete|do|else|enum|export|extends|finally|for|from|function|get|if|implements|import|in|instanceof|interface|let|new|null|of|package|private|protected|public|return|set|static|super|switch|this|throw|try|typeof|undefined|var|void|while|with|yield)\b";

const NUMBER: &str = r"\b(?:NaN|Infinity)\b|\b0[xX][\dA-Fa-f]+(?:_[\dA-Fa-f]+)*n?\b|\b0[bB][01]+(?:_[01]+)*n?\b|\b0[oO][0-7]+(?:_[0-7]+)*n?\b|(?:\b\d+(?:_\d+)*(?:\.(?:\d+(?:_\d+)*)?)?|\B\.\d+(?:_\d+)*)(?:[Ee][+-]?\d+(?:_\d+)*)?n?";

const OPERATOR: &str = r"--|\+\+|\*\*=?|=>|&&=?|\|\|=?|[!=]==|<<=?|>>>?=?|[-+*/%&|^!=<>]=?|\.{3}|\?\?=?|\?\.?|[~:]";

const REGEX: &str = r#"((?:^|[^$\w."'\])\s]|\b(?:return|yield))\s*)/(?:\[(?:[^\]\\\r\n]|\\.)*\]|\\.|[^/\\\[\r\n])+/[dgimsuy]{0,7}(?=\s*(?:$|[\r\n,.;:})\]]|//))"#;

const TEMPLATE: &str = r"`(?:\\[\s\S]|\$\{(?:[^{}]|\{(?:[^{}]|\{[^}]*\})*\})+\}|(?!\$\{)[^\\`])*`";

const INTERPOLATION: &str = r"((?:^|[^\\])(?:\\{2})*)\$\{(?:[^{}]|\{(?:[^{}]|\{[^}]*\})*\})+\}";

pub fn register(store: &mut GrammarStore) -> Result<(), GrammarError> {
    let overrides = GrammarDef::new()
        .rule("keyword", [PatternDef::new(KEYWORD).lookbehind()])
        .rule(
            "function",
            [r"#?[_$a-zA-Z][$\w]*(?=\s*(?:\.\s*(?:apply|bind|call)\s*)?\()"],
        )
        .rule("number", [NUMBER])
        .rule("operator", [OPERATOR]);
    let javascript = store.extend("javascript", "clike", overrides)?;

    store.insert_before(
        javascript,
        "keyword",
        GrammarDef::new()
            .rule(
                "regex",
                [PatternDef::new(REGEX).lookbehind().greedy().inside(
                    GrammarDef::new()
                        .rule(
                            "regex-source",
                            [PatternDef::new(r"^(/)[\s\S]+(?=/[a-z]*$)")
                                .lookbehind()
                                .alias("language-regex")],
                        )
                        .rule("regex-delimiter", [r"^/|/$"])
                        .rule("regex-flags", [r"^[a-z]+$"]),
                )],
            )
            .rule("constant", [r"\b[A-Z](?:[A-Z_]|\dx?)*\b"]),
    )?;

    let interpolation = GrammarDef::new()
        .rule(
            "interpolation-punctuation",
            [PatternDef::new(r"^\$\{|\}$").alias("punctuation")],
        )
        .rest("javascript");
    store.insert_before(
        javascript,
        "string",
        GrammarDef::new()
            .rule(
                "hashbang",
                [PatternDef::new(r"^#!.*").greedy().alias("comment")],
            )
            .rule(
                "template-string",
                [PatternDef::new(TEMPLATE).greedy().inside(
                    GrammarDef::new()
                        .rule(
                            "template-punctuation",
                            [PatternDef::new(r"^`|`$").alias("string")],
                        )
                        .rule(
                            "interpolation",
                            [PatternDef::new(INTERPOLATION)
                                .lookbehind()
                                .inside(interpolation)],
                        )
                        .rule("string", [r"[\s\S]+"]),
                )],
            ),
    )?;

    store.alias("js", "javascript")?;
    markup::add_inlined(store, "script", "javascript")
}
