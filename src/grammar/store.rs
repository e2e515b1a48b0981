//! Grammar store
//!
//! The store owns every compiled grammar in a slot vector and maps language
//! names to slot handles. Grammars never embed each other: an `inside` or
//! `rest` reference is a [`GrammarId`]. Rebuilding a grammar therefore means
//! replacing one slot, and every name, alias or pattern holding that handle
//! resolves to the rebuilt rules without being re-registered.
//!
//! All mutating operations compile their input completely before touching the
//! store. A definition with one bad pattern leaves the store unchanged.

use super::definition::{GrammarDef, InsideDef, PatternDef, RuleDef};
use super::{Grammar, GrammarError, GrammarId, Pattern, Rule};
use indexmap::IndexMap;
use std::sync::Arc;

/// Where [`GrammarStore::extend_at`] puts kinds the base grammar lacks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    End,
    Before(String),
}

/// Registry of named grammars.
#[derive(Debug, Default)]
pub struct GrammarStore {
    slots: Vec<Grammar>,
    languages: IndexMap<String, GrammarId>,
}

impl GrammarStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the built-in languages registered
    pub fn with_builtins() -> Result<Self, GrammarError> {
        let mut store = Self::new();
        crate::languages::register_builtins(&mut store)?;
        Ok(store)
    }

    /// Look up a language by name or alias
    pub fn get(&self, language: &str) -> Option<GrammarId> {
        self.languages.get(language).copied()
    }

    pub fn contains(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    /// Resolve a handle. Handles are only created by this store, so the slot
    /// always exists.
    pub fn grammar(&self, id: GrammarId) -> &Grammar {
        &self.slots[id.0]
    }

    /// Registered language names and aliases, in registration order
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Handle of the nested grammar of the first `kind` pattern that has one
    pub fn inside_of(&self, grammar: GrammarId, kind: &str) -> Option<GrammarId> {
        self.grammar(grammar)
            .rules
            .get(kind)?
            .iter()
            .find_map(|pattern| pattern.inside())
    }

    /// Rules the tokenizer applies for `id`: the grammar's own rules followed
    /// by those of its `rest` grammar. A rest kind that the grammar already has
    /// replaces the own patterns at the own position.
    pub fn effective_rules(&self, id: GrammarId) -> Vec<(&str, &[Arc<Pattern>])> {
        let grammar = self.grammar(id);
        let mut rules: IndexMap<&str, &[Arc<Pattern>]> = grammar.rules().collect();
        if let Some(rest) = grammar.rest {
            for (kind, patterns) in self.grammar(rest).rules() {
                rules.insert(kind, patterns);
            }
        }
        rules.into_iter().collect()
    }

    /// Compile `def` and register it as `language`.
    ///
    /// `inside` and `rest` may name any registered language or `language`
    /// itself. Redefining a name points it at a fresh grammar; grammars that
    /// captured the old handle keep the old rules.
    pub fn define(&mut self, language: &str, def: GrammarDef) -> Result<GrammarId, GrammarError> {
        let mut compiler = Compiler::new(self);
        let root = compiler.reserve();
        compiler.self_ref = Some((language, root));

        let rules = compiler.compile_rules(def.rules)?;
        let rest = def.rest.map(|name| compiler.resolve(&name)).transpose()?;
        compiler.fill(root, Grammar { rules, rest });

        let pending = compiler.finish();
        self.slots.extend(pending);
        self.languages.insert(language.to_string(), root);
        tracing::debug!(language, kinds = self.grammar(root).len(), "defined grammar");
        Ok(root)
    }

    /// Register `alias` as another name for `language`'s grammar.
    pub fn alias(&mut self, alias: &str, language: &str) -> Result<GrammarId, GrammarError> {
        let id = self
            .get(language)
            .ok_or_else(|| GrammarError::UnknownLanguage(language.to_string()))?;
        self.languages.insert(alias.to_string(), id);
        Ok(id)
    }

    /// Register `language` as a copy of `base` with `overrides` applied.
    ///
    /// Overridden kinds keep their position, new kinds are appended. Kinds
    /// that are not overridden share their patterns with `base`.
    pub fn extend(
        &mut self,
        language: &str,
        base: &str,
        overrides: GrammarDef,
    ) -> Result<GrammarId, GrammarError> {
        self.extend_at(language, base, overrides, Placement::End)
    }

    /// Like [`extend`](Self::extend), with control over where new kinds go.
    pub fn extend_at(
        &mut self,
        language: &str,
        base: &str,
        overrides: GrammarDef,
        placement: Placement,
    ) -> Result<GrammarId, GrammarError> {
        let base_id = self
            .get(base)
            .ok_or_else(|| GrammarError::UnknownLanguage(base.to_string()))?;
        let base_grammar = self.grammar(base_id);
        if let Placement::Before(kind) = &placement {
            if !base_grammar.rules.contains_key(kind) {
                return Err(GrammarError::UnknownKind(kind.clone()));
            }
        }

        let mut compiler = Compiler::new(self);
        let root = compiler.reserve();
        compiler.self_ref = Some((language, root));
        let compiled = compiler.compile_rules(overrides.rules)?;
        let rest = match overrides.rest {
            Some(name) => Some(compiler.resolve(&name)?),
            None => base_grammar.rest,
        };

        let mut rules = base_grammar.rules.clone();
        let mut added = IndexMap::new();
        for (kind, rule) in compiled {
            match rules.get_mut(&kind) {
                Some(existing) => *existing = rule,
                None => {
                    added.insert(kind, rule);
                }
            }
        }
        let rules = match placement {
            Placement::End => {
                rules.extend(added);
                rules
            }
            Placement::Before(before) => splice_before(&rules, &before, added),
        };
        compiler.fill(root, Grammar { rules, rest });

        let pending = compiler.finish();
        self.slots.extend(pending);
        self.languages.insert(language.to_string(), root);
        tracing::debug!(language, base, "extended grammar");
        Ok(root)
    }

    /// Rebuild `target` with `rules` spliced in immediately before the
    /// `before` kind.
    ///
    /// Kinds in `rules` that the grammar already has are moved to the new
    /// position. The rebuilt rules replace the slot, so every handle to
    /// `target` observes them.
    pub fn insert_before(
        &mut self,
        target: GrammarId,
        before: &str,
        rules: GrammarDef,
    ) -> Result<(), GrammarError> {
        if !self.grammar(target).rules.contains_key(before) {
            return Err(GrammarError::UnknownKind(before.to_string()));
        }

        let mut compiler = Compiler::new(self);
        let inserted = compiler.compile_rules(rules.rules)?;
        let rebuilt = splice_before(&self.grammar(target).rules, before, inserted);
        let pending = compiler.finish();

        self.slots.extend(pending);
        self.slots[target.0].rules = rebuilt;
        tracing::debug!(before, "inserted rules");
        Ok(())
    }

    /// Name-based form of [`insert_before`](Self::insert_before).
    ///
    /// Without `root` the target is the language `inside`. With `root` the
    /// target is the nested grammar of the `inside` kind of language `root`
    /// (e.g. the attribute grammar inside markup's `tag` rule).
    pub fn insert_before_language(
        &mut self,
        inside: &str,
        before: &str,
        rules: GrammarDef,
        root: Option<&str>,
    ) -> Result<GrammarId, GrammarError> {
        let target = match root {
            None => self
                .get(inside)
                .ok_or_else(|| GrammarError::UnknownLanguage(inside.to_string()))?,
            Some(root) => {
                let root_id = self
                    .get(root)
                    .ok_or_else(|| GrammarError::UnknownLanguage(root.to_string()))?;
                self.inside_of(root_id, inside)
                    .ok_or_else(|| GrammarError::UnknownKind(inside.to_string()))?
            }
        };
        self.insert_before(target, before, rules)?;
        Ok(target)
    }

    /// Parse a JSON grammar definition and register it.
    pub fn load_json(&mut self, language: &str, source: &str) -> Result<GrammarId, GrammarError> {
        let def = GrammarDef::from_json(source)?;
        self.define(language, def)
    }

    /// Parse a YAML grammar definition and register it.
    pub fn load_yaml(&mut self, language: &str, source: &str) -> Result<GrammarId, GrammarError> {
        let def = GrammarDef::from_yaml(source)?;
        self.define(language, def)
    }
}

/// Rebuild `rules`, placing `inserted` right before `before`.
fn splice_before(
    rules: &IndexMap<String, Rule>,
    before: &str,
    inserted: IndexMap<String, Rule>,
) -> IndexMap<String, Rule> {
    let mut rebuilt = IndexMap::with_capacity(rules.len() + inserted.len());
    for (kind, rule) in rules {
        if kind == before {
            for (new_kind, new_rule) in &inserted {
                rebuilt.insert(new_kind.clone(), new_rule.clone());
            }
        }
        if !inserted.contains_key(kind) {
            rebuilt.insert(kind.clone(), rule.clone());
        }
    }
    rebuilt
}

/// Staging area for one store operation. Inline grammars get slots numbered
/// after the store's existing ones; nothing is written to the store until
/// [`finish`](Compiler::finish) hands the slots back.
struct Compiler<'s> {
    store: &'s GrammarStore,
    pending: Vec<Grammar>,
    self_ref: Option<(&'s str, GrammarId)>,
}

impl<'s> Compiler<'s> {
    fn new(store: &'s GrammarStore) -> Self {
        Self {
            store,
            pending: Vec::new(),
            self_ref: None,
        }
    }

    fn reserve(&mut self) -> GrammarId {
        let id = GrammarId(self.store.slots.len() + self.pending.len());
        self.pending.push(Grammar::default());
        id
    }

    fn fill(&mut self, id: GrammarId, grammar: Grammar) {
        self.pending[id.0 - self.store.slots.len()] = grammar;
    }

    fn finish(self) -> Vec<Grammar> {
        self.pending
    }

    fn resolve(&self, language: &str) -> Result<GrammarId, GrammarError> {
        match self.self_ref {
            Some((name, id)) if name == language => Ok(id),
            _ => self
                .store
                .get(language)
                .ok_or_else(|| GrammarError::UnknownLanguage(language.to_string())),
        }
    }

    fn compile_rules(
        &mut self,
        rules: IndexMap<String, RuleDef>,
    ) -> Result<IndexMap<String, Rule>, GrammarError> {
        let mut compiled = IndexMap::with_capacity(rules.len());
        for (kind, RuleDef(patterns)) in rules {
            if patterns.is_empty() {
                return Err(GrammarError::EmptyRule(kind));
            }
            let mut rule = Vec::with_capacity(patterns.len());
            for def in patterns {
                rule.push(Arc::new(self.compile_pattern(&kind, def)?));
            }
            compiled.insert(kind, rule);
        }
        Ok(compiled)
    }

    fn compile_pattern(&mut self, kind: &str, def: PatternDef) -> Result<Pattern, GrammarError> {
        let pattern = Pattern::new(&def.pattern).map_err(|err| match err {
            GrammarError::InvalidPattern {
                pattern, message, ..
            } => GrammarError::InvalidPattern {
                kind: kind.to_string(),
                pattern,
                message,
            },
            other => other,
        })?;
        let inside = match def.inside {
            None => None,
            Some(InsideDef::Language(name)) => Some(self.resolve(&name)?),
            Some(InsideDef::Grammar(grammar)) => Some(self.compile_grammar(*grammar)?),
        };
        Ok(pattern
            .with_greedy(def.greedy)
            .with_lookbehind(def.lookbehind)
            .with_alias(def.alias)
            .with_inside(inside))
    }

    fn compile_grammar(&mut self, def: GrammarDef) -> Result<GrammarId, GrammarError> {
        let id = self.reserve();
        let rules = self.compile_rules(def.rules)?;
        let rest = def.rest.map(|name| self.resolve(&name)).transpose()?;
        self.fill(id, Grammar { rules, rest });
        Ok(id)
    }
}
