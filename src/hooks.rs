//! Hook registry
//!
//! Hooks are named extension points. Each name holds an ordered list of
//! callbacks that receive a mutable environment, so a hook can observe a stage
//! or rewrite what the next stage reads (e.g. replace `code` before it is
//! tokenized).

use std::collections::HashMap;
use std::fmt;

/// Hook names fired by the highlighter.
pub mod names {
    pub const BEFORE_SANITY_CHECK: &str = "before-sanity-check";
    pub const BEFORE_HIGHLIGHT: &str = "before-highlight";
    pub const BEFORE_TOKENIZE: &str = "before-tokenize";
    pub const AFTER_TOKENIZE: &str = "after-tokenize";
    pub const WRAP: &str = "wrap";
    pub const BEFORE_INSERT: &str = "before-insert";
    pub const AFTER_HIGHLIGHT: &str = "after-highlight";
    pub const COMPLETE: &str = "complete";
}

pub type Hook<E> = Box<dyn Fn(&mut E) + Send + Sync>;

/// Named, ordered callback lists over an environment type `E`.
pub struct HookRegistry<E> {
    hooks: HashMap<String, Vec<Hook<E>>>,
}

impl<E> HookRegistry<E> {
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Append a callback to the hook `name`.
    pub fn add<F>(&mut self, name: &str, callback: F)
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.hooks
            .entry(name.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Run every callback registered for `name`, in registration order.
    pub fn run(&self, name: &str, env: &mut E) {
        let Some(callbacks) = self.hooks.get(name) else {
            return;
        };
        tracing::trace!(hook = name, callbacks = callbacks.len(), "running hook");
        for callback in callbacks {
            callback(env);
        }
    }

    /// Number of callbacks registered for `name`
    pub fn len(&self, name: &str) -> usize {
        self.hooks.get(name).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }

    /// Drop every callback registered for `name`.
    pub fn clear(&mut self, name: &str) {
        self.hooks.remove(name);
    }
}

impl<E> Default for HookRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for HookRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.hooks.keys().collect();
        names.sort();
        f.debug_struct("HookRegistry").field("hooks", &names).finish()
    }
}
