//! JSON

use crate::grammar::{GrammarDef, GrammarError, GrammarStore, PatternDef};

pub fn register(store: &mut GrammarStore) -> Result<(), GrammarError> {
    let def = GrammarDef::new()
        .rule(
            "property",
            [PatternDef::new(r#"(^|[^\\])"(?:\\.|[^\\"\r\n])*"(?=\s*:)"#)
                .lookbehind()
                .greedy()],
        )
        .rule(
            "string",
            [PatternDef::new(r#"(^|[^\\])"(?:\\.|[^\\"\r\n])*"(?!\s*:)"#)
                .lookbehind()
                .greedy()],
        )
        .rule(
            "comment",
            [PatternDef::new(r"//.*|/\*[\s\S]*?(?:\*/|$)").greedy()],
        )
        .rule("number", [r"(?i)-?\b\d+(?:\.\d+)?(?:e[+-]?\d+)?\b"])
        .rule("punctuation", [r"[{}\[\],]"])
        .rule("operator", [":"])
        .rule("boolean", [r"\b(?:false|true)\b"])
        .rule("null", [PatternDef::new(r"\bnull\b").alias("keyword")]);

    store.define("json", def)?;
    store.alias("webmanifest", "json")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{flatten_text, TokenNode};
    use crate::tokenizer::Tokenizer;

    fn tokenize(text: &str) -> Vec<TokenNode> {
        let mut store = GrammarStore::new();
        register(&mut store).unwrap();
        Tokenizer::new(&store).tokenize_language(text, "json").unwrap()
    }

    #[test]
    fn test_property_and_string_are_distinguished() {
        let nodes = tokenize(r#"{"key": "value"}"#);
        let kinds: Vec<_> = nodes
            .iter()
            .filter_map(TokenNode::as_token)
            .map(|token| (token.kind.as_str(), token.text()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("punctuation", "{".to_string()),
                ("property", "\"key\"".to_string()),
                ("operator", ":".to_string()),
                ("string", "\"value\"".to_string()),
                ("punctuation", "}".to_string()),
            ]
        );
    }

    #[test]
    fn test_null_is_aliased() {
        let nodes = tokenize("[null, -1.5e3]");
        let null = nodes[1].as_token().unwrap();
        assert_eq!(null.kind, "null");
        assert_eq!(null.alias, vec!["keyword"]);
        let number = nodes
            .iter()
            .filter_map(TokenNode::as_token)
            .find(|token| token.kind == "number")
            .unwrap();
        assert_eq!(number.text(), "-1.5e3");
        assert_eq!(flatten_text(&nodes), "[null, -1.5e3]");
    }
}
