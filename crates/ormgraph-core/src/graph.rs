//! Ancestor and delegation resolution over the string-keyed model graph.
//!
//! Extension edges come from every declaration sharing a model name, so the
//! graph has many roots and may contain cycles in malformed sources. All
//! traversals here terminate regardless of the input shape.

use std::collections::{HashMap, HashSet};

use crate::registry::ModelRegistry;
use crate::types::Delegation;

/// Per-request evaluation state: the model names currently being resolved.
///
/// Nested resolutions share one context, so a model that reappears while its
/// own ancestors are still being computed is cut off instead of recursed into.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    resolving: Vec<String>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolving(&self, model: &str) -> bool {
        self.resolving.iter().any(|m| m == model)
    }

    /// True when no resolution is in progress.
    pub fn is_idle(&self) -> bool {
        self.resolving.is_empty()
    }

    fn enter(&mut self, model: &str) {
        self.resolving.push(model.to_string());
    }

    fn leave(&mut self) {
        self.resolving.pop();
    }
}

/// Linearized ancestor names, self first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorNames {
    pub names: Vec<String>,
    /// Set when a model already in progress in the caller's context was cut
    /// off; such a chain is only valid inside that context.
    pub truncated: bool,
}

pub struct ModelGraph<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> ModelGraph<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a ModelRegistry {
        self.registry
    }

    /// Ancestor chain of `model`: the model itself, then every extended model
    /// depth-first in declaration order, first occurrence wins. Extended
    /// names with no declarations stay in the chain with no parents of their
    /// own.
    pub fn ancestor_chain(&self, model: &str, ctx: &mut EvalContext) -> AncestorNames {
        let mut chain = AncestorNames {
            names: vec![model.to_string()],
            truncated: false,
        };
        if ctx.is_resolving(model) {
            tracing::trace!(model, "ancestor chain truncated at root");
            chain.truncated = true;
            return chain;
        }

        let mut seen: HashSet<String> = HashSet::from([model.to_string()]);
        ctx.enter(model);
        self.collect_parents(model, ctx, &mut seen, &mut chain);
        ctx.leave();
        chain
    }

    fn collect_parents(
        &self,
        model: &str,
        ctx: &mut EvalContext,
        seen: &mut HashSet<String>,
        chain: &mut AncestorNames,
    ) {
        for decl in self.registry.declarations_for(model) {
            for parent in &decl.extends {
                if seen.contains(parent) {
                    continue;
                }
                if ctx.is_resolving(parent) {
                    tracing::trace!(model, parent = %parent, "ancestor chain truncated");
                    chain.truncated = true;
                    continue;
                }
                seen.insert(parent.clone());
                chain.names.push(parent.clone());

                ctx.enter(parent);
                self.collect_parents(parent, ctx, seen, chain);
                ctx.leave();
            }
        }
    }

    /// Delegated models of `model` with the local field exposing each one.
    ///
    /// Entries keep first-appearance order; a later declaration naming the
    /// same delegated model replaces its field. Delegated models without
    /// declarations are skipped. Single level: the delegates' own
    /// delegations are not followed.
    pub fn delegation_children(&self, model: &str) -> Vec<Delegation> {
        let mut children: Vec<Delegation> = Vec::new();
        for decl in self.registry.declarations_for(model) {
            for delegation in &decl.delegates {
                if !self.registry.contains(&delegation.model) {
                    continue;
                }
                match children.iter_mut().find(|c| c.model == delegation.model) {
                    Some(existing) => existing.field = delegation.field.clone(),
                    None => children.push(delegation.clone()),
                }
            }
        }
        children
    }

    /// Extension cycles between distinct models, each rendered as the chain
    /// of names from the first repeated model back to itself.
    ///
    /// A declaration extending its own model name is an in-place extension,
    /// not a cycle.
    pub fn extension_cycles(&self) -> Vec<Vec<String>> {
        let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
        for name in self.registry.model_names() {
            let parents = adj.entry(name.as_str()).or_default();
            for decl in self.registry.declarations_for(name) {
                for parent in &decl.extends {
                    if parent != name
                        && self.registry.contains(parent)
                        && !parents.contains(&parent.as_str())
                    {
                        parents.push(parent.as_str());
                    }
                }
            }
        }

        let mut cycles = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = Vec::new();
        for name in self.registry.model_names() {
            if !visited.contains(name.as_str()) {
                dfs_detect_cycle(name, &adj, &mut visited, &mut stack, &mut cycles);
            }
        }
        cycles
    }
}

fn dfs_detect_cycle<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    visited.insert(node);
    stack.push(node);

    if let Some(parents) = adj.get(node) {
        for &parent in parents {
            if !visited.contains(parent) {
                dfs_detect_cycle(parent, adj, visited, stack, cycles);
            } else if let Some(start) = stack.iter().position(|&n| n == parent) {
                let mut chain: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                chain.push(parent.to_string());
                cycles.push(chain);
            }
        }
    }

    stack.pop();
}
