//! Highlighting façade
//!
//! [`Highlighter`] ties the pieces together: a [`GrammarStore`], hook
//! registries and the render configuration. It exposes the whole pipeline
//! (hooks, tokenize, hooks, render) for raw text and for code elements that
//! declare their language through a `language-xxx` / `lang-xxx` class.
//!
//! Highlighting never fails: unknown languages, grammars removed by a hook and
//! oversized inputs all fall back to the escaped input.

use crate::config::{GlintConfig, GrammarFormat};
use crate::grammar::{GrammarError, GrammarId, GrammarStore};
use crate::hooks::{names, HookRegistry};
use crate::render::{escape, Renderer, WrapEnv};
use crate::token::TokenNode;
use crate::tokenizer::Tokenizer;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;

static LANGUAGE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\blang(?:uage)?-([\w-]+)\b").expect("language class pattern is valid")
});

/// Errors raised while building a [`Highlighter`] from configuration
#[derive(Debug, Error)]
pub enum HighlightError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("failed to read grammar file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Environment shared by the highlight hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightEnv {
    pub code: String,
    /// Grammar used for tokenizing; a hook may clear it to skip tokenization
    pub grammar: Option<GrammarId>,
    pub language: String,
    /// Filled after tokenizing
    pub tokens: Vec<TokenNode>,
    /// Filled after rendering
    pub highlighted: String,
}

impl HighlightEnv {
    fn new(code: &str, grammar: Option<GrammarId>, language: &str) -> Self {
        Self {
            code: code.to_string(),
            grammar,
            language: language.to_string(),
            tokens: Vec::new(),
            highlighted: String::new(),
        }
    }
}

/// A code element: its text plus the classes of the element and its
/// ancestors (nearest first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeElement {
    pub code: String,
    pub class: String,
    pub ancestor_classes: Vec<String>,
}

impl CodeElement {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Add an enclosing element's class. Call from the nearest ancestor out.
    pub fn with_ancestor_class(mut self, class: impl Into<String>) -> Self {
        self.ancestor_classes.push(class.into());
        self
    }

    /// Language declared on the element or the nearest ancestor, lowercased.
    pub fn declared_language(&self) -> Option<String> {
        std::iter::once(&self.class)
            .chain(&self.ancestor_classes)
            .find_map(|class| LANGUAGE_CLASS.captures(class))
            .map(|captures| captures[1].to_lowercase())
    }

    /// Declared language, or `none`.
    pub fn language(&self) -> String {
        self.declared_language()
            .unwrap_or_else(|| "none".to_string())
    }

    /// The element's class with every language class replaced by a single
    /// `language-<language>`.
    fn normalized_class(&self, language: &str) -> String {
        let language_class = format!("language-{language}");
        let mut classes: Vec<&str> = self
            .class
            .split_whitespace()
            .filter(|class| !LANGUAGE_CLASS.is_match(class))
            .collect();
        classes.push(&language_class);
        classes.join(" ")
    }
}

/// Result of [`Highlighter::highlight_element`]. The caller inserts `markup`
/// into the element and sets its class to `class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedElement {
    pub language: String,
    pub class: String,
    pub markup: String,
}

/// Grammar store, hooks and render settings.
#[derive(Debug)]
pub struct Highlighter {
    store: GrammarStore,
    hooks: HookRegistry<HighlightEnv>,
    wrap_hooks: HookRegistry<WrapEnv>,
    config: GlintConfig,
}

impl Highlighter {
    /// Highlighter with the built-in languages and default configuration.
    pub fn new() -> Result<Self, GrammarError> {
        Ok(Self::with_store(GrammarStore::with_builtins()?))
    }

    /// Highlighter over an existing store, with default configuration.
    pub fn with_store(store: GrammarStore) -> Self {
        Self {
            store,
            hooks: HookRegistry::new(),
            wrap_hooks: HookRegistry::new(),
            config: GlintConfig::default(),
        }
    }

    /// Replace the configuration. Only render and tokenizer settings take
    /// effect; language settings are read by [`from_config`](Self::from_config).
    pub fn with_config(mut self, config: GlintConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a highlighter from configuration: built-ins (if enabled), extra
    /// grammar files, then language aliases.
    pub fn from_config(config: GlintConfig) -> Result<Self, HighlightError> {
        let mut store = if config.languages.builtins {
            GrammarStore::with_builtins()?
        } else {
            GrammarStore::new()
        };

        for extra in &config.languages.extra {
            let source =
                std::fs::read_to_string(&extra.path).map_err(|source| HighlightError::Io {
                    path: extra.path.clone(),
                    source,
                })?;
            match extra.format() {
                GrammarFormat::Json => store.load_json(&extra.name, &source)?,
                GrammarFormat::Yaml => store.load_yaml(&extra.name, &source)?,
            };
            tracing::debug!(language = %extra.name, path = %extra.path.display(), "loaded grammar file");
        }

        for (alias, language) in &config.languages.aliases {
            store.alias(alias, language)?;
        }

        Ok(Self::with_store(store).with_config(config))
    }

    pub fn store(&self) -> &GrammarStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GrammarStore {
        &mut self.store
    }

    pub fn config(&self) -> &GlintConfig {
        &self.config
    }

    /// Register a pipeline hook (see [`names`]).
    pub fn add_hook<F>(&mut self, name: &str, callback: F)
    where
        F: Fn(&mut HighlightEnv) + Send + Sync + 'static,
    {
        self.hooks.add(name, callback);
    }

    /// Register a `wrap` hook, run for every rendered token.
    pub fn add_wrap_hook<F>(&mut self, callback: F)
    where
        F: Fn(&mut WrapEnv) + Send + Sync + 'static,
    {
        self.wrap_hooks.add(names::WRAP, callback);
    }

    /// Tokenize `text` with a language looked up by name.
    pub fn tokenize(&self, text: &str, language: &str) -> Option<Vec<TokenNode>> {
        Tokenizer::new(&self.store).tokenize_language(text, language)
    }

    /// Render a token tree with the configured tag, prefix and wrap hooks.
    pub fn render(&self, tokens: &[TokenNode], language: &str) -> String {
        Renderer::new(self.config.render.clone())
            .with_hooks(&self.wrap_hooks)
            .render(tokens, language)
    }

    /// Highlight `text` with `grammar`. `language` is passed on to hooks and
    /// the wrap environment.
    pub fn highlight(&self, text: &str, grammar: GrammarId, language: &str) -> String {
        let mut env = HighlightEnv::new(text, Some(grammar), language);
        self.run_highlight(&mut env);
        env.highlighted
    }

    /// Highlight `text` with a language looked up by name. Unknown languages
    /// produce the escaped input.
    pub fn highlight_language(&self, text: &str, language: &str) -> String {
        match self.store.get(language) {
            Some(grammar) => self.highlight(text, grammar, language),
            None => {
                tracing::debug!(language, "no grammar for language, escaping input");
                escape(text).into_owned()
            }
        }
    }

    /// Highlight a code element, running the element-level hooks around the
    /// pipeline.
    pub fn highlight_element(&self, element: &CodeElement) -> HighlightedElement {
        let language = element.language();
        let class = element.normalized_class(&language);
        let grammar = self.store.get(&language);
        let mut env = HighlightEnv::new(&element.code, grammar, &language);

        self.hooks.run(names::BEFORE_SANITY_CHECK, &mut env);
        if env.code.is_empty() {
            self.hooks.run(names::COMPLETE, &mut env);
            return HighlightedElement {
                language,
                class,
                markup: env.code,
            };
        }

        self.hooks.run(names::BEFORE_HIGHLIGHT, &mut env);
        if env.grammar.is_some() {
            self.run_highlight(&mut env);
        } else {
            env.highlighted = escape(&env.code).into_owned();
        }

        self.hooks.run(names::BEFORE_INSERT, &mut env);
        self.hooks.run(names::AFTER_HIGHLIGHT, &mut env);
        self.hooks.run(names::COMPLETE, &mut env);

        HighlightedElement {
            language,
            class,
            markup: env.highlighted,
        }
    }

    /// Highlight every element that declares a language, in order.
    pub fn highlight_all<'e, I>(&self, elements: I) -> Vec<HighlightedElement>
    where
        I: IntoIterator<Item = &'e CodeElement>,
    {
        elements
            .into_iter()
            .filter(|element| element.declared_language().is_some())
            .map(|element| self.highlight_element(element))
            .collect()
    }

    fn run_highlight(&self, env: &mut HighlightEnv) {
        self.hooks.run(names::BEFORE_TOKENIZE, env);

        let Some(grammar) = env.grammar else {
            env.highlighted = escape(&env.code).into_owned();
            return;
        };

        let cap = self.config.tokenizer.max_input_bytes;
        if cap > 0 && env.code.len() > cap {
            tracing::warn!(
                language = %env.language,
                bytes = env.code.len(),
                cap,
                "input exceeds max_input_bytes, rendering as plain text"
            );
            env.highlighted = escape(&env.code).into_owned();
            return;
        }

        env.tokens = Tokenizer::new(&self.store).tokenize(&env.code, grammar);
        self.hooks.run(names::AFTER_TOKENIZE, env);
        env.highlighted = self.render(&env.tokens, &env.language);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtraGrammar;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn highlighter() -> Highlighter {
        Highlighter::new().unwrap()
    }

    #[test]
    fn test_highlighter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Highlighter>();
    }

    #[test]
    fn test_unknown_language_is_escaped() {
        assert_eq!(
            highlighter().highlight_language("a < b & c", "cobol"),
            "a &lt; b &amp; c"
        );
    }

    #[test]
    fn test_plain_text_is_escaped() {
        assert_eq!(highlighter().highlight_language("<p>", "txt"), "&lt;p>");
    }

    #[test]
    fn test_highlight_json() {
        assert_eq!(
            highlighter().highlight_language("[true]", "json"),
            r#"<span class="token punctuation">[</span><span class="token boolean">true</span><span class="token punctuation">]</span>"#
        );
    }

    #[test]
    fn test_before_tokenize_can_rewrite_code() {
        let mut hl = highlighter();
        hl.add_hook(names::BEFORE_TOKENIZE, |env| env.code = env.code.trim().to_string());
        hl.add_hook(names::AFTER_TOKENIZE, |env| {
            env.tokens.retain(|node| node.is_token());
        });
        assert_eq!(
            hl.highlight_language("  null  ", "json"),
            r#"<span class="token null keyword">null</span>"#
        );
    }

    #[test]
    fn test_clearing_grammar_renders_plain_text() {
        let mut hl = highlighter();
        hl.add_hook(names::BEFORE_TOKENIZE, |env| env.grammar = None);
        assert_eq!(hl.highlight_language("1 < 2", "js"), "1 &lt; 2");
    }

    #[test]
    fn test_oversized_input_is_not_tokenized() {
        let mut config = GlintConfig::default();
        config.tokenizer.max_input_bytes = 4;
        let hl = highlighter().with_config(config);
        assert_eq!(hl.highlight_language("true && false", "js"), "true &amp;&amp; false");
        assert_eq!(
            hl.highlight_language("true", "js"),
            r#"<span class="token boolean">true</span>"#
        );
    }

    #[test]
    fn test_wrap_hook_and_render_config() {
        let mut config = GlintConfig::default();
        config.render.tag = "code".into();
        let mut hl = highlighter().with_config(config);
        hl.add_wrap_hook(|env| {
            env.attributes
                .insert("data-language".into(), env.language.clone());
        });
        assert_eq!(
            hl.highlight_language("1", "json"),
            r#"<code class="token number" data-language="json">1</code>"#
        );
    }

    #[test]
    fn test_language_detection() {
        let element = CodeElement::new("x").with_class("block Lang-JS");
        assert_eq!(element.language(), "js");

        let element = CodeElement::new("x")
            .with_class("inner")
            .with_ancestor_class("wrapper")
            .with_ancestor_class("language-css line-numbers");
        assert_eq!(element.language(), "css");

        let element = CodeElement::new("x").with_class("plain-block");
        assert_eq!(element.declared_language(), None);
        assert_eq!(element.language(), "none");
    }

    #[test]
    fn test_highlight_element_hook_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hl = highlighter();
        for name in [
            names::BEFORE_SANITY_CHECK,
            names::BEFORE_HIGHLIGHT,
            names::BEFORE_TOKENIZE,
            names::AFTER_TOKENIZE,
            names::BEFORE_INSERT,
            names::AFTER_HIGHLIGHT,
            names::COMPLETE,
        ] {
            let log = Arc::clone(&log);
            hl.add_hook(name, move |_| log.lock().unwrap().push(name));
        }

        let element = CodeElement::new("true").with_class("lang-JSON big");
        let result = hl.highlight_element(&element);
        assert_eq!(result.language, "json");
        assert_eq!(result.class, "big language-json");
        assert_eq!(result.markup, r#"<span class="token boolean">true</span>"#);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "before-sanity-check",
                "before-highlight",
                "before-tokenize",
                "after-tokenize",
                "before-insert",
                "after-highlight",
                "complete",
            ]
        );

        log.lock().unwrap().clear();
        let empty = hl.highlight_element(&CodeElement::new("").with_class("language-js"));
        assert_eq!(empty.markup, "");
        assert_eq!(*log.lock().unwrap(), vec!["before-sanity-check", "complete"]);

        log.lock().unwrap().clear();
        let unknown = hl.highlight_element(&CodeElement::new("a<b").with_class("language-x"));
        assert_eq!(unknown.markup, "a&lt;b");
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "before-sanity-check",
                "before-highlight",
                "before-insert",
                "after-highlight",
                "complete",
            ]
        );
    }

    #[test]
    fn test_highlight_all_skips_undeclared() {
        let hl = highlighter();
        let elements = vec![
            CodeElement::new("1").with_class("language-json"),
            CodeElement::new("2"),
            CodeElement::new("<i>").with_ancestor_class("lang-none"),
        ];
        let results = hl.highlight_all(&elements);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].markup, r#"<span class="token number">1</span>"#);
        assert_eq!(results[1].language, "none");
        assert_eq!(results[1].markup, "&lt;i>");
    }

    #[test]
    fn test_from_config_loads_extra_grammars_and_aliases() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "comment: '^;.*'\nsection: '^\\[[^\\]]+\\]'").unwrap();

        let mut config = GlintConfig::default();
        config.languages.builtins = false;
        config.languages.extra.push(ExtraGrammar {
            name: "ini".into(),
            path: file.path().to_path_buf(),
            format: None,
        });
        config.languages.aliases.insert("cfg".into(), "ini".into());

        let hl = Highlighter::from_config(config).unwrap();
        assert!(!hl.store().contains("js"));
        assert_eq!(
            hl.highlight_language("[a]", "cfg"),
            r#"<span class="token section">[a]</span>"#
        );
    }

    #[test]
    fn test_from_config_reports_missing_file() {
        let mut config = GlintConfig::default();
        config.languages.extra.push(ExtraGrammar {
            name: "ini".into(),
            path: PathBuf::from("/definitely/not/here.json"),
            format: None,
        });
        assert!(matches!(
            Highlighter::from_config(config).unwrap_err(),
            HighlightError::Io { .. }
        ));
    }

    #[test]
    fn test_from_config_reports_unknown_alias_target() {
        let mut config = GlintConfig::default();
        config.languages.aliases.insert("x".into(), "missing".into());
        assert!(matches!(
            Highlighter::from_config(config).unwrap_err(),
            HighlightError::Grammar(GrammarError::UnknownLanguage(_))
        ));
    }
}
