use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::{GraphError, Result};
use crate::graph::EvalContext;
use crate::model_type::ModelType;
use crate::project::Snapshot;
use crate::record_set::RecordSetVariant;
use crate::types::{Declaration, FieldKind, Member, SourceLocation};

/// A member as declared in one specific [`Declaration`].
///
/// Two symbols are equal when they point at the same member of the same
/// declaration instance.
#[derive(Debug, Clone)]
pub struct Symbol {
    declaration: Arc<Declaration>,
    index: usize,
}

impl Symbol {
    fn new(declaration: &Arc<Declaration>, index: usize) -> Self {
        Self {
            declaration: Arc::clone(declaration),
            index,
        }
    }

    pub fn member(&self) -> &Member {
        &self.declaration.members[self.index]
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn name(&self) -> &str {
        &self.member().name
    }

    /// Model the declaring construct contributes to.
    pub fn owner(&self) -> Option<&str> {
        self.declaration.model.as_deref()
    }

    pub fn field_kind(&self) -> Option<&FieldKind> {
        self.member().field_kind()
    }

    pub fn loc(&self) -> &SourceLocation {
        &self.member().loc
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.declaration, &other.declaration) && self.index == other.index
    }
}

impl Eq for Symbol {}

/// A delegated model together with the local field exposing it.
#[derive(Debug, Clone)]
pub struct DelegationChild {
    pub class: Arc<ModelClass>,
    pub field: String,
}

pub type ClassChain = Arc<[Arc<ModelClass>]>;

/// Canonical merged view of one model name within an analysis generation.
///
/// Obtained from [`Snapshot::model_class`]; there is exactly one instance per
/// name per generation. Every query fails with [`GraphError::Stale`] once the
/// generation has been invalidated.
pub struct ModelClass {
    name: String,
    generation: u64,
    current: Arc<AtomicU64>,
    snapshot: Weak<Snapshot>,
    ancestors: RwLock<Option<ClassChain>>,
    delegation: RwLock<Option<Arc<[DelegationChild]>>>,
    types: RwLock<HashMap<RecordSetVariant, Arc<ModelType>>>,
}

impl ModelClass {
    pub(crate) fn new(
        name: &str,
        generation: u64,
        current: Arc<AtomicU64>,
        snapshot: Weak<Snapshot>,
    ) -> Self {
        Self {
            name: name.to_string(),
            generation,
            current,
            snapshot,
            ancestors: RwLock::new(None),
            delegation: RwLock::new(None),
            types: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_valid(&self) -> bool {
        self.check_valid().is_ok()
    }

    /// Fails once the generation has rotated or the owning snapshot is gone.
    pub(crate) fn check_valid(&self) -> Result<()> {
        let current = self.current.load(Ordering::Acquire);
        if current != self.generation || self.snapshot.strong_count() == 0 {
            return Err(GraphError::stale(&self.name, self.generation, current));
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.check_valid()?;
        self.snapshot.upgrade().ok_or_else(|| {
            GraphError::stale(&self.name, self.generation, self.current.load(Ordering::Acquire))
        })
    }

    /// Canonical class of another model in the same generation.
    pub fn sibling(&self, model: &str) -> Result<Arc<ModelClass>> {
        Ok(self.snapshot()?.model_class(model))
    }

    /// Declarations contributing directly to this model, in load order.
    pub fn declarations(&self) -> Result<Vec<Arc<Declaration>>> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.registry().declarations_for(&self.name).to_vec())
    }

    /// False for names with no declarations at all.
    pub fn is_model(&self) -> Result<bool> {
        Ok(self.snapshot()?.registry().contains(&self.name))
    }

    /// This class followed by every extended class, closest first.
    ///
    /// A chain computed outside any other resolution is memoized; a chain
    /// truncated by the caller's in-progress set is returned uncached.
    pub fn ancestor_chain(&self, ctx: &mut EvalContext) -> Result<ClassChain> {
        self.check_valid()?;
        if let Some(chain) = self.ancestors.read().as_ref() {
            return Ok(Arc::clone(chain));
        }

        let snapshot = self.snapshot()?;
        let resolved = snapshot.graph().ancestor_chain(&self.name, ctx);
        let chain: ClassChain = resolved
            .names
            .iter()
            .map(|name| snapshot.model_class(name))
            .collect();
        if resolved.truncated {
            return Ok(chain);
        }

        let mut slot = self.ancestors.write();
        self.check_valid()?;
        Ok(Arc::clone(slot.get_or_insert(chain)))
    }

    /// Delegated classes with the local field exposing each one.
    pub fn delegation_children(&self) -> Result<Arc<[DelegationChild]>> {
        self.check_valid()?;
        if let Some(children) = self.delegation.read().as_ref() {
            return Ok(Arc::clone(children));
        }

        let snapshot = self.snapshot()?;
        let children: Arc<[DelegationChild]> = snapshot
            .graph()
            .delegation_children(&self.name)
            .into_iter()
            .map(|d| DelegationChild {
                class: snapshot.model_class(&d.model),
                field: d.field,
            })
            .collect();

        let mut slot = self.delegation.write();
        self.check_valid()?;
        Ok(Arc::clone(slot.get_or_insert(children)))
    }

    /// Member declared by this model itself. Later declarations override
    /// earlier ones.
    pub fn find_own_member(&self, name: &str) -> Result<Option<Symbol>> {
        let snapshot = self.snapshot()?;
        for decl in snapshot.registry().declarations_for(&self.name).iter().rev() {
            if let Some(index) = decl.members.iter().rposition(|m| m.name == name) {
                return Ok(Some(Symbol::new(decl, index)));
            }
        }
        Ok(None)
    }

    /// First member named `name` along the ancestor chain.
    pub fn find_member(&self, name: &str, ctx: &mut EvalContext) -> Result<Option<Symbol>> {
        for class in self.ancestor_chain(ctx)?.iter() {
            if let Some(symbol) = class.find_own_member(name)? {
                return Ok(Some(symbol));
            }
        }
        Ok(None)
    }

    /// First field named `name` along the ancestor chain; methods of the
    /// same name are skipped.
    pub fn find_inherited_field(&self, name: &str, ctx: &mut EvalContext) -> Result<Option<Symbol>> {
        for class in self.ancestor_chain(ctx)?.iter() {
            if let Some(symbol) = class.find_own_member(name)? {
                if symbol.member().is_field() {
                    return Ok(Some(symbol));
                }
            }
        }
        Ok(None)
    }

    /// Field visible on this model: inherited first, then fields promoted
    /// from delegated models (one level).
    pub fn find_field(&self, name: &str, ctx: &mut EvalContext) -> Result<Option<Symbol>> {
        if let Some(symbol) = self.find_inherited_field(name, ctx)? {
            return Ok(Some(symbol));
        }
        Ok(self.find_delegated_field(name, ctx)?.map(|(symbol, _)| symbol))
    }

    /// Field found through a delegated model, with the local field it is
    /// reached through.
    pub fn find_delegated_field(
        &self,
        name: &str,
        ctx: &mut EvalContext,
    ) -> Result<Option<(Symbol, String)>> {
        for child in self.delegation_children()?.iter() {
            if let Some(symbol) = child.class.find_inherited_field(name, ctx)? {
                return Ok(Some((symbol, child.field.clone())));
            }
        }
        Ok(None)
    }

    /// Resolve `names` as a chain of fields, switching to the comodel after
    /// every relational segment. Absent when a segment is missing or a
    /// non-relational field is followed by more segments.
    pub fn find_field_by_path(&self, names: &[&str], ctx: &mut EvalContext) -> Result<Option<Symbol>> {
        let snapshot = self.snapshot()?;
        let Some((last, intermediate)) = names.split_last() else {
            return Ok(None);
        };

        let mut target: Option<Arc<ModelClass>> = None;
        for name in intermediate {
            let class = target.as_deref().unwrap_or(self);
            let Some(field) = class.find_field(name, ctx)? else {
                return Ok(None);
            };
            match field.field_kind().and_then(FieldKind::comodel) {
                Some(comodel) => target = Some(snapshot.model_class(comodel)),
                None => return Ok(None),
            }
        }
        target.as_deref().unwrap_or(self).find_field(last, ctx)
    }

    /// Canonical [`ModelType`] of this class for `variant`.
    pub fn model_type(self: &Arc<Self>, variant: RecordSetVariant) -> Result<Arc<ModelType>> {
        self.check_valid()?;
        if let Some(ty) = self.types.read().get(&variant) {
            return Ok(Arc::clone(ty));
        }

        let mut types = self.types.write();
        self.check_valid()?;
        let ty = types
            .entry(variant)
            .or_insert_with(|| Arc::new(ModelType::new(Arc::clone(self), variant)));
        Ok(Arc::clone(ty))
    }

    pub(crate) fn retire(&self) {
        self.ancestors.write().take();
        self.delegation.write().take();
        self.types.write().clear();
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClass")
            .field("name", &self.name)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_string;
    use crate::project::Project;
    use pretty_assertions::assert_eq;

    fn project(sources: &[(&str, &str)]) -> Project {
        Project::new(
            sources
                .iter()
                .map(|(file, src)| parse_string(src, file))
                .collect(),
        )
    }

    fn names(chain: &[Arc<ModelClass>]) -> Vec<&str> {
        chain.iter().map(|c| c.name()).collect()
    }

    #[test]
    fn chain_members_are_canonical_classes() {
        let p = project(&[("base.models.md", "## a : b\n## b")]);
        let a = p.model_class("a");
        let chain = a.ancestor_chain(&mut EvalContext::new()).unwrap();
        assert_eq!(names(&chain), ["a", "b"]);
        assert!(Arc::ptr_eq(&chain[0], &a));
        assert!(Arc::ptr_eq(&chain[1], &p.model_class("b")));
    }

    #[test]
    fn later_declaration_overrides_member() {
        let p = project(&[
            ("base.models.md", "## a\n- x: Char\n- y: Integer"),
            ("ext.models.md", "## : a\n- x: Text"),
        ]);
        let a = p.model_class("a");
        let x = a.find_member("x", &mut EvalContext::new()).unwrap().unwrap();
        assert_eq!(x.declaration().module, "ext");
        assert_eq!(x.field_kind(), Some(&FieldKind::Text));
        let y = a.find_member("y", &mut EvalContext::new()).unwrap().unwrap();
        assert_eq!(y.declaration().module, "base");
    }

    #[test]
    fn own_members_shadow_ancestors() {
        let p = project(&[("m.models.md", "## parent\n- x: Char\n## child : parent\n- x: Integer")]);
        let x = p
            .model_class("child")
            .find_member("x", &mut EvalContext::new())
            .unwrap()
            .unwrap();
        assert_eq!(x.owner(), Some("child"));
    }

    #[test]
    fn field_lookup_skips_methods_and_reaches_delegates() {
        let p = project(&[(
            "m.models.md",
            "## res.partner\n- email: Char\n## res.users\n- login: Char\n### Delegates\n- res.partner: partner_id",
        )]);
        let users = p.model_class("res.users");
        let mut ctx = EvalContext::new();
        let email = users.find_field("email", &mut ctx).unwrap().unwrap();
        assert_eq!(email.owner(), Some("res.partner"));
        let (_, via) = users.find_delegated_field("email", &mut ctx).unwrap().unwrap();
        assert_eq!(via, "partner_id");
        assert!(users.find_field("missing", &mut ctx).unwrap().is_none());
    }

    #[test]
    fn path_switches_to_comodel() {
        let p = project(&[(
            "m.models.md",
            "## res.country\n- code: Char\n## res.partner\n- country_id: Many2one(res.country)\n- name: Char\n## sale.order\n- partner_id: Many2one(res.partner)",
        )]);
        let order = p.model_class("sale.order");
        let mut ctx = EvalContext::new();
        let code = order
            .find_field_by_path(&["partner_id", "country_id", "code"], &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(code.owner(), Some("res.country"));
        assert!(order
            .find_field_by_path(&["partner_id", "name", "code"], &mut ctx)
            .unwrap()
            .is_none());
        assert!(order
            .find_field_by_path(&["partner_id", "nope"], &mut ctx)
            .unwrap()
            .is_none());
        assert!(order.find_field_by_path(&[], &mut ctx).unwrap().is_none());
    }

    #[test]
    fn unknown_model_is_empty() {
        let p = project(&[]);
        let ghost = p.model_class("ghost");
        let mut ctx = EvalContext::new();
        assert!(!ghost.is_model().unwrap());
        assert!(ghost.find_member("x", &mut ctx).unwrap().is_none());
        assert!(ghost.delegation_children().unwrap().is_empty());
    }

    #[test]
    fn stale_after_invalidation() {
        let p = project(&[("m.models.md", "## a\n- x: Char")]);
        let a = p.model_class("a");
        assert!(a.is_valid());
        p.invalidate_all();
        assert!(!a.is_valid());
        let err = a.find_member("x", &mut EvalContext::new()).unwrap_err();
        assert!(err.is_stale());
        assert!(a.model_type(RecordSetVariant::Singleton).is_err());
    }

    #[test]
    fn model_type_is_canonical_per_variant() {
        let p = project(&[("m.models.md", "## a")]);
        let a = p.model_class("a");
        let t1 = a.model_type(RecordSetVariant::Collection).unwrap();
        let t2 = a.model_type(RecordSetVariant::Collection).unwrap();
        let t3 = a.model_type(RecordSetVariant::Singleton).unwrap();
        assert!(Arc::ptr_eq(&t1, &t2));
        assert!(!Arc::ptr_eq(&t1, &t3));
    }
}
