//! Tokenizer engine
//!
//! Applies a grammar to text by repeatedly splitting unclassified fragments of
//! a [`TokenStream`] around pattern matches.
//!
//! Rules are applied one pattern at a time, in kind order and then pattern
//! order. Each pattern walks the whole stream before the next one starts, so
//! a rule listed earlier claims its spans first and a later rule only ever sees
//! what is left.
//!
//! Fragment-mode patterns match inside a single unclassified fragment. Greedy
//! (input-mode) patterns match against the full input from the running offset
//! and may swallow several stream nodes, including tokens that lie entirely
//! inside the match. A greedy match that would start inside a token, or end
//! inside one, is abandoned at that position; existing tokens are never split.
//!
//! When a match swallows more than one node, the text following the new token
//! is re-scanned with the higher-priority rules, up to the furthest offset the
//! match touched (its *reach*). The rule that caused the re-scan ends it, which
//! bounds the recursion.

use super::stream::{NodeId, TokenStream};
use crate::grammar::{GrammarId, GrammarStore, Pattern, ScanMode};
use crate::token::{Token, TokenContent, TokenNode};
use std::sync::Arc;

/// Re-scan frame opened after a match consumed several nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rescan {
    /// (kind index, pattern index) of the rule whose match opened the frame
    cause: (usize, usize),
    /// Offset beyond which the frame does not scan
    reach: usize,
}

/// One grammar level: the input and the rules applied to it.
struct Pass<'a> {
    text: &'a str,
    rules: &'a [(&'a str, &'a [Arc<Pattern>])],
}

/// Tokenizes text with grammars from a [`GrammarStore`].
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'g> {
    store: &'g GrammarStore,
}

impl<'g> Tokenizer<'g> {
    pub fn new(store: &'g GrammarStore) -> Self {
        Self { store }
    }

    /// Tokenize `text` with `grammar`, returning the token tree.
    pub fn tokenize(&self, text: &str, grammar: GrammarId) -> Vec<TokenNode> {
        let rules = self.store.effective_rules(grammar);
        let pass = Pass {
            text,
            rules: &rules,
        };

        let mut stream = TokenStream::new();
        let head = stream.head();
        stream.insert_after(head, TokenNode::Text(text.to_string()));
        self.match_grammar(&pass, &mut stream, head, 0, None);
        stream.into_vec()
    }

    /// Tokenize with a language looked up by name.
    pub fn tokenize_language(&self, text: &str, language: &str) -> Option<Vec<TokenNode>> {
        let grammar = self.store.get(language)?;
        Some(self.tokenize(text, grammar))
    }

    fn match_grammar(
        &self,
        pass: &Pass<'_>,
        stream: &mut TokenStream,
        start: NodeId,
        start_pos: usize,
        mut rescan: Option<&mut Rescan>,
    ) {
        for (kind_index, (_, patterns)) in pass.rules.iter().enumerate() {
            for pattern_index in 0..patterns.len() {
                let rule = (kind_index, pattern_index);
                if rescan.as_deref().is_some_and(|frame| frame.cause == rule) {
                    return;
                }
                self.apply_pattern(pass, stream, rule, start, start_pos, rescan.as_deref_mut());
            }
        }
    }

    fn apply_pattern(
        &self,
        pass: &Pass<'_>,
        stream: &mut TokenStream,
        rule: (usize, usize),
        start: NodeId,
        start_pos: usize,
        mut rescan: Option<&mut Rescan>,
    ) {
        let (kind, patterns) = pass.rules[rule.0];
        let pattern = &patterns[rule.1];
        let text = pass.text;
        let tail = stream.tail();

        let mut current = stream.next(start);
        let mut pos = start_pos;

        'scan: while current != tail {
            'node: {
                if rescan.as_deref().is_some_and(|frame| pos >= frame.reach) {
                    break 'scan;
                }
                if stream.len() > text.len() {
                    tracing::debug!(
                        kind,
                        pattern = pattern.source(),
                        nodes = stream.len(),
                        "token stream outgrew its input, stopping rule"
                    );
                    break 'scan;
                }

                let Some(TokenNode::Text(fragment)) = stream.value(current) else {
                    break 'node;
                };

                let mut remove_count = 1;
                let (fragment, from, matched_len) = match pattern.scan_mode() {
                    ScanMode::Fragment => {
                        let Some(found) = pattern.find(fragment, 0) else {
                            break 'node;
                        };
                        (fragment.clone(), found.index, found.text.len())
                    }
                    ScanMode::Input => {
                        let Some(found) = pattern.find(text, pos) else {
                            break 'scan;
                        };
                        if found.index >= text.len() {
                            break 'scan;
                        }
                        let from = found.index;
                        let to = found.end();

                        // Move to the node containing the match start.
                        let mut p = pos + stream.node_len(current);
                        while from >= p {
                            current = stream.next(current);
                            if current == tail {
                                break 'scan;
                            }
                            p += stream.node_len(current);
                        }
                        p -= stream.node_len(current);
                        pos = p;

                        if stream.value(current).is_some_and(TokenNode::is_token) {
                            break 'node;
                        }

                        // Swallow nodes up to the match end, then any raw
                        // fragments directly after it.
                        let mut k = current;
                        while k != tail
                            && (p < to || stream.value(k).is_some_and(|v| !v.is_token()))
                        {
                            let len = stream.node_len(k);
                            let is_token = stream.value(k).is_some_and(TokenNode::is_token);
                            if is_token && p + len > to {
                                break 'node;
                            }
                            remove_count += 1;
                            p += len;
                            k = stream.next(k);
                        }
                        remove_count -= 1;

                        (text[pos..p].to_string(), from - pos, to - from)
                    }
                };

                let before = &fragment[..from];
                let matched = &fragment[from..from + matched_len];
                let after = &fragment[from + matched_len..];

                let reach = pos + fragment.len();
                if let Some(frame) = rescan.as_deref_mut() {
                    frame.reach = frame.reach.max(reach);
                }

                let mut remove_from = stream.prev(current);
                if !before.is_empty() {
                    remove_from = stream.insert_after(remove_from, TokenNode::Text(before.to_string()));
                    pos += before.len();
                }
                stream.remove_range(remove_from, remove_count);

                let content = match pattern.inside() {
                    Some(inside) => TokenContent::Nested(self.tokenize(matched, inside)),
                    None => TokenContent::Text(matched.to_string()),
                };
                let token = Token::new(kind, content, pattern.alias().to_vec(), matched.len());
                current = stream.insert_after(remove_from, TokenNode::Token(token));
                if !after.is_empty() {
                    stream.insert_after(current, TokenNode::Text(after.to_string()));
                }

                if remove_count > 1 {
                    let mut nested = Rescan {
                        cause: rule,
                        reach,
                    };
                    let resume = stream.prev(current);
                    self.match_grammar(pass, stream, resume, pos, Some(&mut nested));
                    if let Some(frame) = rescan.as_deref_mut() {
                        frame.reach = frame.reach.max(nested.reach);
                    }
                }
            }

            pos += stream.node_len(current);
            current = stream.next(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarDef, PatternDef};
    use crate::token::flatten_text;

    fn run(def: GrammarDef, text: &str) -> Vec<TokenNode> {
        let mut store = GrammarStore::new();
        let id = store.define("test", def).unwrap();
        Tokenizer::new(&store).tokenize(text, id)
    }

    fn tok(kind: &str, text: &str) -> TokenNode {
        TokenNode::Token(Token::new(
            kind,
            TokenContent::Text(text.into()),
            vec![],
            text.len(),
        ))
    }

    fn raw(text: &str) -> TokenNode {
        TokenNode::Text(text.into())
    }

    #[test]
    fn test_empty_grammar_leaves_text_alone() {
        let nodes = run(GrammarDef::new(), "a < b");
        assert_eq!(nodes, vec![raw("a < b")]);
    }

    #[test]
    fn test_earlier_kind_wins_over_longer_match() {
        let def = GrammarDef::new().rule("a", ["foo"]).rule("b", ["foobar"]);
        assert_eq!(run(def, "foobar"), vec![tok("a", "foo"), raw("bar")]);
    }

    #[test]
    fn test_first_listed_pattern_wins_within_kind() {
        let def = GrammarDef::new().rule(
            "word",
            [
                PatternDef::new("ab").alias("first"),
                PatternDef::new("abc").alias("second"),
            ],
        );
        let nodes = run(def, "abc");
        let token = nodes[0].as_token().unwrap();
        assert_eq!(token.alias, vec!["first"]);
        assert_eq!(nodes[1], raw("c"));
    }

    #[test]
    fn test_every_occurrence_is_matched() {
        let def = GrammarDef::new().rule("number", [r"\d+"]);
        assert_eq!(
            run(def, "1 + 22"),
            vec![tok("number", "1"), raw(" + "), tok("number", "22")]
        );
    }

    #[test]
    fn test_lookbehind_prefix_stays_outside_token() {
        let def = GrammarDef::new().rule(
            "comment",
            [PatternDef::new(r"(^|[^\\])#.*").lookbehind()],
        );
        assert_eq!(
            run(def, "x#comment"),
            vec![raw("x"), tok("comment", "#comment")]
        );
    }

    #[test]
    fn test_inside_grammar_builds_subtree() {
        let def = GrammarDef::new().rule(
            "tag",
            [PatternDef::new("<[^>]+>").inside(
                GrammarDef::new()
                    .rule("punctuation", ["[<>]"])
                    .rule("name", [r"\w+"]),
            )],
        );
        let nodes = run(def, "a <b> c");
        assert_eq!(nodes.len(), 3);
        let tag = nodes[1].as_token().unwrap();
        assert_eq!(tag.kind, "tag");
        assert_eq!(tag.length, 3);
        assert_eq!(
            tag.children().unwrap(),
            &[tok("punctuation", "<"), tok("name", "b"), tok("punctuation", ">")]
        );
    }

    #[test]
    fn test_greedy_match_swallows_enclosed_token() {
        let def = GrammarDef::new()
            .rule("comment", [r"#\w*"])
            .rule("string", [PatternDef::new(r#""[^"]*""#).greedy()]);
        assert_eq!(
            run(def, r#"x "a#b c" y"#),
            vec![raw("x "), tok("string", r#""a#b c""#), raw(" y")]
        );
    }

    #[test]
    fn test_greedy_match_never_splits_a_token() {
        let def = GrammarDef::new()
            .rule("comment", ["#.*"])
            .rule("string", [PatternDef::new(r#""[^"]*""#).greedy()]);
        assert_eq!(
            run(def, r#""a#b" c"#),
            vec![raw("\"a"), tok("comment", "#b\" c")]
        );
    }

    #[test]
    fn test_greedy_match_starting_inside_token_is_skipped() {
        let def = GrammarDef::new()
            .rule("comment", ["#.*"])
            .rule("string", [PatternDef::new(r#""[^"]*""#).greedy()]);
        assert_eq!(
            run(def, r#"a #"x" "y""#),
            vec![raw("a "), tok("comment", r#"#"x" "y""#)]
        );
    }

    #[test]
    fn test_fragment_pattern_cannot_cross_tokens() {
        let def = GrammarDef::new()
            .rule("comment", [r"#\w*"])
            .rule("string", [r#""[^"]*""#]);
        assert_eq!(
            run(def, r#""a#b c""#),
            vec![raw("\"a"), tok("comment", "#b"), raw(" c\"")]
        );
    }

    #[test]
    fn test_rescan_applies_earlier_rules_to_merged_text() {
        let def = GrammarDef::new()
            .rule("hash", ["#"])
            .rule("start", ["^b"])
            .rule("string", [PatternDef::new("'[^']*'").greedy()]);
        assert_eq!(
            run(def, "'#'b"),
            vec![tok("string", "'#'"), tok("start", "b")]
        );
    }

    #[test]
    fn test_empty_matches_stop_at_guard() {
        let def = GrammarDef::new().rule("empty", ["a*"]);
        let nodes = run(def, "bbb");
        assert_eq!(flatten_text(&nodes), "bbb");
        assert_eq!(nodes.last(), Some(&raw("bbb")));
        assert!(nodes.len() <= "bbb".len() + 1);
    }

    #[test]
    fn test_alias_is_copied_to_token() {
        let def = GrammarDef::new().rule(
            "null",
            [PatternDef::new(r"\bnull\b").alias("keyword")],
        );
        let nodes = run(def, "null");
        assert_eq!(nodes[0].as_token().unwrap().alias, vec!["keyword"]);
    }

    #[test]
    fn test_rest_rules_apply_after_own_rules() {
        let mut store = GrammarStore::new();
        store
            .define("base", GrammarDef::new().rule("number", [r"\d+"]))
            .unwrap();
        let id = store
            .define(
                "derived",
                GrammarDef::new().rule("var", [r"\$\w+"]).rest("base"),
            )
            .unwrap();
        let nodes = Tokenizer::new(&store).tokenize("$a1 2", id);
        assert_eq!(nodes, vec![tok("var", "$a1"), raw(" "), tok("number", "2")]);
    }

    #[test]
    fn test_recursive_inside_grammar() {
        let mut store = GrammarStore::new();
        store
            .define(
                "parens",
                GrammarDef::new().rule(
                    "group",
                    [PatternDef::new(r"\((?:[^()]|\([^()]*\))*\)").inside(
                        GrammarDef::new()
                            .rule("punctuation", [PatternDef::new(r"^\(|\)$").greedy()])
                            .rest("parens"),
                    )],
                ),
            )
            .unwrap();
        let nodes = Tokenizer::new(&store)
            .tokenize_language("((x))", "parens")
            .unwrap();
        assert_eq!(flatten_text(&nodes), "((x))");
        let outer = nodes[0].as_token().unwrap();
        let inner = outer.children().unwrap()[1].as_token().unwrap();
        assert_eq!(inner.kind, "group");
        assert_eq!(inner.text(), "(x)");
    }

    #[test]
    fn test_unknown_language() {
        let store = GrammarStore::new();
        assert!(Tokenizer::new(&store).tokenize_language("x", "nope").is_none());
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let def = GrammarDef::new()
            .rule("comment", [PatternDef::new("//.*").greedy()])
            .rule("string", [PatternDef::new(r#""[^"]*""#).greedy()]);
        let text = "é \"ü//ß\" // ñ";
        let nodes = run(def, text);
        assert_eq!(flatten_text(&nodes), text);
    }
}
