//! Markup (HTML, XML, SVG, MathML)

use crate::grammar::{GrammarDef, GrammarError, GrammarStore, PatternDef};

const TAG: &str = r#"</?(?!\d)[^\s>/=$<%]+(?:\s(?:\s*[^\s>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s'">=]+(?=[\s>]))|(?=[\s/>])))+)?\s*/?>"#;

const DOCTYPE: &str = r#"(?i)<!DOCTYPE(?:[^>"'\[\]]|"[^"]*"|'[^']*')+(?:\[(?:[^<"'\]]|"[^"]*"|'[^']*'|<(?!!--)|<!--(?:[^-]|-(?!->))*-->)*\]\s*)?>"#;

fn entity() -> [PatternDef; 2] {
    [
        PatternDef::new(r"(?i)&[\da-z]{1,8};").alias("named-entity"),
        PatternDef::new(r"(?i)&#x?[\da-f]{1,8};"),
    ]
}

fn namespace() -> GrammarDef {
    GrammarDef::new().rule("namespace", [r"^[^\s>/:]+:"])
}

fn tag_inside() -> GrammarDef {
    GrammarDef::new()
        .rule(
            "tag",
            [PatternDef::new(r"^</?[^\s>/]+").inside(
                GrammarDef::new()
                    .rule("punctuation", [r"^</?"])
                    .rule("namespace", [r"^[^\s>/:]+:"]),
            )],
        )
        .rule(
            "attr-value",
            [PatternDef::new(r#"=\s*(?:"[^"]*"|'[^']*'|[^\s'">=]+)"#).inside(
                GrammarDef::new()
                    .rule(
                        "punctuation",
                        [
                            PatternDef::new("^=").alias("attr-equals"),
                            PatternDef::new(r#"^(\s*)["']|["']$"#).lookbehind(),
                        ],
                    )
                    .rule("entity", entity()),
            )],
        )
        .rule("punctuation", [r"/?>"])
        .rule(
            "attr-name",
            [PatternDef::new(r"[^\s>/]+").inside(namespace())],
        )
}

fn doctype_inside() -> GrammarDef {
    GrammarDef::new()
        .rule(
            "internal-subset",
            [PatternDef::new(r"(^[^\[]*\[)[\s\S]+(?=\]>$)")
                .lookbehind()
                .greedy()
                .inside_language("markup")],
        )
        .rule("string", [PatternDef::new(r#""[^"]*"|'[^']*'"#).greedy()])
        .rule("punctuation", [r"^<!|>$|[\[\]]"])
        .rule("doctype-tag", [r"(?i)^DOCTYPE"])
        .rule("name", [r#"[^\s<>'"]+"#])
}

pub fn register(store: &mut GrammarStore) -> Result<(), GrammarError> {
    let def = GrammarDef::new()
        .rule("comment", [PatternDef::new(r"<!--(?:(?!<!--)[\s\S])*?-->").greedy()])
        .rule("prolog", [PatternDef::new(r"<\?[\s\S]+?\?>").greedy()])
        .rule(
            "doctype",
            [PatternDef::new(DOCTYPE).greedy().inside(doctype_inside())],
        )
        .rule("cdata", [PatternDef::new(r"(?i)<!\[CDATA\[[\s\S]*?\]\]>").greedy()])
        .rule("tag", [PatternDef::new(TAG).greedy().inside(tag_inside())])
        .rule("entity", entity());

    store.define("markup", def)?;
    for alias in ["html", "xml", "svg", "mathml"] {
        store.alias(alias, "markup")?;
    }
    Ok(())
}

/// Highlight the body of `<tag_name>` elements with `language`.
///
/// The rule goes right before markup's `tag` rule, so the element body is
/// claimed before the surrounding tags are. The body token carries the
/// `language-<language>` alias.
pub fn add_inlined(
    store: &mut GrammarStore,
    tag_name: &str,
    language: &str,
) -> Result<(), GrammarError> {
    let pattern = format!(r"(?i)(<{tag_name}[^>]*>)[\s\S]+?(?=</{tag_name}>)");
    let rules = GrammarDef::new().rule(
        tag_name,
        [PatternDef::new(pattern)
            .lookbehind()
            .greedy()
            .alias(format!("language-{language}"))
            .inside_language(language)],
    );
    store.insert_before_language("markup", "tag", rules, None)?;
    Ok(())
}
