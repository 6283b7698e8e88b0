use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{Declaration, ParsedModule};

/// Index from model name to every declaration contributing to it.
///
/// Declarations keep module load order. The registry is derived data: it is
/// built once per analysis generation and never updated in place.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    entries: HashMap<String, Vec<Arc<Declaration>>>,
    /// Model names in first-seen order
    names: Vec<String>,
    /// Every declaration in load order, models or not
    all: Vec<Arc<Declaration>>,
}

impl ModelRegistry {
    pub fn build(modules: &[ParsedModule]) -> Self {
        let mut registry = ModelRegistry::default();

        for module in modules {
            for decl in &module.declarations {
                let decl = Arc::new(decl.clone());
                if let Some(ref name) = decl.model {
                    let entry = registry.entries.entry(name.clone()).or_default();
                    if entry.is_empty() {
                        registry.names.push(name.clone());
                    }
                    entry.push(Arc::clone(&decl));
                }
                registry.all.push(decl);
            }
        }

        tracing::debug!(
            modules = modules.len(),
            models = registry.names.len(),
            declarations = registry.all.len(),
            "model registry built"
        );
        registry
    }

    /// Declarations of `model` in load order; empty for unknown names.
    pub fn declarations_for(&self, model: &str) -> &[Arc<Declaration>] {
        self.entries.get(model).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, model: &str) -> bool {
        self.entries.contains_key(model)
    }

    /// Model names in the order they were first declared.
    pub fn model_names(&self) -> &[String] {
        &self.names
    }

    /// All declarations in load order, including those that are not models.
    pub fn declarations(&self) -> &[Arc<Declaration>] {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_string;

    #[test]
    fn merges_declarations_across_modules_in_load_order() {
        let base = parse_string("## res.partner\n- name: Char", "base.models.md");
        let mail = parse_string("## : res.partner\n- email: Char\n## mail.thread", "mail.models.md");
        let registry = ModelRegistry::build(&[base, mail]);

        let decls = registry.declarations_for("res.partner");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].module, "base");
        assert_eq!(decls[1].module, "mail");
        assert_eq!(registry.model_names(), ["res.partner", "mail.thread"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_model_is_empty_not_error() {
        let registry = ModelRegistry::build(&[]);
        assert!(registry.declarations_for("nope").is_empty());
        assert!(!registry.contains("nope"));
        assert!(registry.is_empty());
    }

    #[test]
    fn keeps_non_model_declarations() {
        let parsed = parse_string("## : a.mixin, b.mixin\n## c.model", "x.models.md");
        let registry = ModelRegistry::build(&[parsed]);
        assert_eq!(registry.declarations().len(), 2);
        assert_eq!(registry.len(), 1);
    }
}
