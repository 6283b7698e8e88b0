//! Analysis generations.
//!
//! A [`Project`] owns the current declaration set. Everything derived from
//! it (registry, model classes, model types) hangs off one [`Snapshot`] that
//! is tagged with a generation number. `invalidate_all` bumps the generation
//! and drops the snapshot; objects handed out earlier keep the old number and
//! report a stale error from then on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;

use crate::error::Result;
use crate::graph::ModelGraph;
use crate::model_class::ModelClass;
use crate::model_type::ModelType;
use crate::record_set::RecordSetVariant;
use crate::registry::ModelRegistry;
use crate::types::ParsedModule;

pub struct Project {
    generation: Arc<AtomicU64>,
    modules: RwLock<Arc<Vec<ParsedModule>>>,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl Project {
    /// Create a project over modules given in load order.
    pub fn new(modules: Vec<ParsedModule>) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(1)),
            modules: RwLock::new(Arc::new(modules)),
            current: RwLock::new(None),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn modules(&self) -> Arc<Vec<ParsedModule>> {
        self.modules.read().clone()
    }

    /// The snapshot of the current generation, built on first access.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        if let Some(snapshot) = self.current.read().as_ref() {
            if snapshot.is_current() {
                return Arc::clone(snapshot);
            }
        }

        let mut current = self.current.write();
        if let Some(snapshot) = current.as_ref() {
            if snapshot.is_current() {
                return Arc::clone(snapshot);
            }
        }

        let generation = self.generation();
        let modules = self.modules.read().clone();
        let snapshot = Snapshot::new(generation, Arc::clone(&self.generation), modules);
        tracing::debug!(generation, "analysis snapshot created");
        *current = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub fn model_class(&self, model: &str) -> Arc<ModelClass> {
        self.snapshot().model_class(model)
    }

    pub fn model_type(&self, model: &str, variant: RecordSetVariant) -> Result<Arc<ModelType>> {
        self.snapshot().model_type(model, variant)
    }

    /// Discard every derived cache. Classes and types obtained before this
    /// call fail with a stale error on next use.
    pub fn invalidate_all(&self) {
        let mut current = self.current.write();
        self.rotate(&mut current);
    }

    /// Replace the declaration set (a source change) and invalidate.
    pub fn replace_modules(&self, modules: Vec<ParsedModule>) {
        let mut current = self.current.write();
        *self.modules.write() = Arc::new(modules);
        self.rotate(&mut current);
    }

    fn rotate(&self, current: &mut Option<Arc<Snapshot>>) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if let Some(old) = current.take() {
            old.retire();
        }
        tracing::debug!(generation, "model caches invalidated");
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Derived state of one analysis generation.
pub struct Snapshot {
    generation: u64,
    current: Arc<AtomicU64>,
    modules: Arc<Vec<ParsedModule>>,
    registry: OnceLock<ModelRegistry>,
    classes: RwLock<HashMap<String, Arc<ModelClass>>>,
    this: Weak<Snapshot>,
}

impl Snapshot {
    fn new(generation: u64, current: Arc<AtomicU64>, modules: Arc<Vec<ParsedModule>>) -> Arc<Self> {
        Arc::new_cyclic(|this| Snapshot {
            generation,
            current,
            modules,
            registry: OnceLock::new(),
            classes: RwLock::new(HashMap::new()),
            this: this.clone(),
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }

    pub fn modules(&self) -> &[ParsedModule] {
        &self.modules
    }

    /// The model registry, built once by whichever caller gets here first.
    pub fn registry(&self) -> &ModelRegistry {
        self.registry
            .get_or_init(|| ModelRegistry::build(&self.modules))
    }

    pub fn graph(&self) -> ModelGraph<'_> {
        ModelGraph::new(self.registry())
    }

    /// The canonical class for `model`. Unknown names yield a class with no
    /// declarations, on which every lookup comes back empty.
    pub fn model_class(&self, model: &str) -> Arc<ModelClass> {
        if let Some(class) = self.classes.read().get(model) {
            return Arc::clone(class);
        }

        let mut classes = self.classes.write();
        let class = Arc::new(ModelClass::new(
            model,
            self.generation,
            Arc::clone(&self.current),
            self.this.clone(),
        ));
        if !self.is_current() {
            return class;
        }
        Arc::clone(classes.entry(model.to_string()).or_insert(class))
    }

    pub fn model_type(&self, model: &str, variant: RecordSetVariant) -> Result<Arc<ModelType>> {
        self.model_class(model).model_type(variant)
    }

    /// Empty the class table and every class cache. Classes hold their own
    /// chain and their types hold the class, so this is what frees them.
    fn retire(&self) {
        let classes: Vec<Arc<ModelClass>> = self.classes.write().drain().map(|(_, c)| c).collect();
        if classes.is_empty() {
            return;
        }
        for class in &classes {
            class.retire();
        }
        tracing::trace!(
            generation = self.generation,
            classes = classes.len(),
            "snapshot retired"
        );
    }
}

impl Drop for Snapshot {
    fn drop(&mut self) {
        self.retire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_string;

    fn project(src: &str) -> Project {
        Project::new(vec![parse_string(src, "test.models.md")])
    }

    #[test]
    fn snapshot_is_shared_within_a_generation() {
        let p = project("## a");
        let s1 = p.snapshot();
        let s2 = p.snapshot();
        assert!(Arc::ptr_eq(&s1, &s2));
        assert!(Arc::ptr_eq(&s1.model_class("a"), &s2.model_class("a")));
    }

    #[test]
    fn invalidation_rotates_generation() {
        let p = project("## a");
        let before = p.snapshot();
        let generation = p.generation();
        p.invalidate_all();
        assert_eq!(p.generation(), generation + 1);
        assert!(!before.is_current());
        let after = p.snapshot();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.is_current());
    }

    #[test]
    fn replace_modules_reflects_new_declarations() {
        let p = project("## a");
        assert!(p.snapshot().registry().contains("a"));
        p.replace_modules(vec![parse_string("## b", "test.models.md")]);
        let registry_has = |m: &str| p.snapshot().registry().contains(m);
        assert!(!registry_has("a"));
        assert!(registry_has("b"));
    }

    #[test]
    fn dropping_project_frees_classes() {
        let p = project("## a : b\n## b\n- x: Char");
        let a = p.model_class("a");
        let mut ctx = crate::graph::EvalContext::new();
        a.ancestor_chain(&mut ctx).unwrap();
        a.model_type(RecordSetVariant::Singleton)
            .unwrap()
            .member_lookup("x", &mut ctx)
            .unwrap();
        let a_weak = Arc::downgrade(&a);
        let b_weak = Arc::downgrade(&p.model_class("b"));
        drop(a);
        drop(p);
        assert!(a_weak.upgrade().is_none());
        assert!(b_weak.upgrade().is_none());
    }

    #[test]
    fn class_outliving_its_project_is_stale() {
        let p = project("## a\n- x: Char");
        let a = p.model_class("a");
        let mut ctx = crate::graph::EvalContext::new();
        a.ancestor_chain(&mut ctx).unwrap();
        assert!(a.is_valid());
        drop(p);
        assert!(!a.is_valid());
        assert!(a.ancestor_chain(&mut ctx).unwrap_err().is_stale());
        assert!(a.model_type(RecordSetVariant::Unbound).unwrap_err().is_stale());
    }

    #[test]
    fn retired_snapshot_does_not_cache_classes() {
        let p = project("## a");
        let old = p.snapshot();
        p.invalidate_all();
        let c1 = old.model_class("a");
        let c2 = old.model_class("a");
        assert!(!Arc::ptr_eq(&c1, &c2));
        assert!(!c1.is_valid());
    }
}
