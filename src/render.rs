//! Markup rendering
//!
//! Turns a token tree into HTML-like markup. Raw text is escaped exactly once,
//! here; tokens become `<span class="token kind alias...">` elements (tag and
//! prefix come from [`RenderConfig`]). Each token passes through the `wrap`
//! hook before it is emitted, so callers can add classes or attributes.

use crate::config::RenderConfig;
use crate::hooks::{names, HookRegistry};
use crate::token::{TokenContent, TokenNode};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt::Write;

/// Environment handed to `wrap` hooks, one per token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapEnv {
    pub kind: String,
    /// Already rendered (and escaped) inner markup
    pub content: String,
    pub tag: String,
    pub classes: Vec<String>,
    /// Extra attributes, emitted in insertion order
    pub attributes: IndexMap<String, String>,
    pub language: String,
}

/// Escape text for inclusion in markup.
///
/// Only `&` and `<` need escaping in element content. Non-breaking spaces are
/// turned into plain spaces.
pub fn escape(text: &str) -> Cow<'_, str> {
    const SPECIAL: &[char] = &['&', '<', '\u{a0}'];
    if !text.contains(SPECIAL) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '\u{a0}' => out.push(' '),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

fn escape_attribute(value: &str) -> String {
    value.replace('"', "&quot;")
}

/// Renders token trees to markup.
#[derive(Debug, Clone, Default)]
pub struct Renderer<'h> {
    config: RenderConfig,
    hooks: Option<&'h HookRegistry<WrapEnv>>,
}

impl<'h> Renderer<'h> {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            hooks: None,
        }
    }

    /// Run `wrap` hooks from `hooks` for every token.
    pub fn with_hooks(mut self, hooks: &'h HookRegistry<WrapEnv>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Render `nodes` depth-first, left to right.
    pub fn render(&self, nodes: &[TokenNode], language: &str) -> String {
        let mut out = String::new();
        self.render_into(nodes, language, &mut out);
        out
    }

    fn render_into(&self, nodes: &[TokenNode], language: &str, out: &mut String) {
        for node in nodes {
            match node {
                TokenNode::Text(text) => out.push_str(&escape(text)),
                TokenNode::Token(token) => {
                    let content = match &token.content {
                        TokenContent::Text(text) => escape(text).into_owned(),
                        TokenContent::Nested(children) => self.render(children, language),
                    };

                    let mut classes = Vec::with_capacity(token.alias.len() + 2);
                    if !self.config.class_prefix.is_empty() {
                        classes.push(self.config.class_prefix.clone());
                    }
                    classes.push(token.kind.clone());
                    classes.extend(token.alias.iter().cloned());

                    let mut env = WrapEnv {
                        kind: token.kind.clone(),
                        content,
                        tag: self.config.tag.clone(),
                        classes,
                        attributes: IndexMap::new(),
                        language: language.to_string(),
                    };
                    if let Some(hooks) = self.hooks {
                        hooks.run(names::WRAP, &mut env);
                    }
                    emit(&env, out);
                }
            }
        }
    }
}

fn emit(env: &WrapEnv, out: &mut String) {
    // Writing to a String cannot fail.
    let _ = write!(out, "<{} class=\"{}\"", env.tag, env.classes.join(" "));
    for (name, value) in &env.attributes {
        let _ = write!(out, " {}=\"{}\"", name, escape_attribute(value));
    }
    let _ = write!(out, ">{}</{}>", env.content, env.tag);
}
