//! CSS, plus `<style>` bodies in markup

use super::{markup, QUOTED_STRING};
use crate::grammar::{GrammarDef, GrammarError, GrammarStore, PatternDef};

pub fn register(store: &mut GrammarStore) -> Result<(), GrammarError> {
    let atrule = format!(r#"@[\w-](?:[^;{{\s"']|\s+(?!\s)|{QUOTED_STRING})*?(?:;|(?=\s*\{{))"#);
    let url = format!(r#"(?i)\burl\((?:{QUOTED_STRING}|(?:[^\\\r\n()"']|\\[\s\S])*)\)"#);
    let selector =
        format!(r#"(^|[{{}}\s])[^{{}}\s](?:[^{{}};"'\s]|\s+(?![\s{{])|{QUOTED_STRING})*(?=\s*\{{)"#);

    let def = GrammarDef::new()
        .rule("comment", [r"/\*[\s\S]*?\*/"])
        .rule(
            "atrule",
            [PatternDef::new(atrule).inside(
                GrammarDef::new().rule("rule", [r"^@[\w-]+"]).rule(
                    "keyword",
                    [PatternDef::new(r"(^|[^\w-])(?:and|not|only|or)(?![\w-])").lookbehind()],
                ),
            )],
        )
        .rule(
            "url",
            [PatternDef::new(url).greedy().inside(
                GrammarDef::new()
                    .rule("function", [r"(?i)^url"])
                    .rule("punctuation", [r"^\(|\)$"])
                    .rule(
                        "string",
                        [PatternDef::new(format!("^(?:{QUOTED_STRING})$")).alias("url")],
                    ),
            )],
        )
        .rule("selector", [PatternDef::new(selector).lookbehind()])
        .rule("string", [PatternDef::new(QUOTED_STRING).greedy()])
        .rule(
            "property",
            [PatternDef::new(r"(^|[^-\w])[-_a-zA-Z][-\w]*(?=\s*:)").lookbehind()],
        )
        .rule("important", [r"(?i)!important\b"])
        .rule(
            "function",
            [PatternDef::new(r"(?i)(^|[^-a-z0-9])[-a-z0-9]+(?=\()").lookbehind()],
        )
        .rule("punctuation", [r"[(){};:,]"]);

    store.define("css", def)?;
    markup::add_inlined(store, "style", "css")
}
