//! Record-set aware model types and value typing of fields.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::catalogs::{ID, PATH_SEPARATOR};
use crate::error::Result;
use crate::graph::EvalContext;
use crate::model_class::{ModelClass, Symbol};
use crate::record_set::RecordSetVariant;
use crate::types::{Declaration, FieldKind, Member, MemberKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Bool,
    Int,
    Float,
    Str,
    Date,
    Datetime,
}

impl PrimitiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::Str => "str",
            PrimitiveType::Date => "date",
            PrimitiveType::Datetime => "datetime",
        }
    }
}

/// Static type of a field value or expression.
#[derive(Debug, Clone)]
pub enum ValueType {
    Primitive(PrimitiveType),
    Model(Arc<ModelType>),
}

impl ValueType {
    pub fn as_model(&self) -> Option<&Arc<ModelType>> {
        match self {
            ValueType::Model(ty) => Some(ty),
            ValueType::Primitive(_) => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, ValueType::Primitive(_))
    }

    /// Text shown next to completion entries: the primitive name or the
    /// model name.
    pub fn type_text(&self) -> String {
        match self {
            ValueType::Primitive(p) => p.as_str().to_string(),
            ValueType::Model(ty) => ty.name().to_string(),
        }
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueType::Primitive(a), ValueType::Primitive(b)) => a == b,
            (ValueType::Model(a), ValueType::Model(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Primitive(p) => f.write_str(p.as_str()),
            ValueType::Model(ty) => write!(f, "{ty}"),
        }
    }
}

/// A callable found through a [`ModelType`], bound to that type as receiver.
#[derive(Debug, Clone)]
pub struct BoundMethod {
    pub symbol: Symbol,
    pub receiver: Arc<ModelType>,
}

impl BoundMethod {
    pub fn params(&self) -> &[String] {
        match &self.symbol.member().kind {
            MemberKind::Method { params } => params,
            MemberKind::Field { .. } => &[],
        }
    }
}

/// Outcome of [`ModelType::member_lookup`].
#[derive(Debug, Clone)]
pub enum ResolvedMember {
    Field(Symbol),
    /// Field of a delegated model, reached through the local field `via`.
    Delegated { symbol: Symbol, via: String },
    Method(BoundMethod),
}

impl ResolvedMember {
    pub fn symbol(&self) -> &Symbol {
        match self {
            ResolvedMember::Field(symbol) | ResolvedMember::Delegated { symbol, .. } => symbol,
            ResolvedMember::Method(method) => &method.symbol,
        }
    }

    pub fn name(&self) -> &str {
        self.symbol().name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Identifier,
    Field,
    Method,
    DelegatedField,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionItem {
    pub name: String,
    pub kind: CompletionKind,
    /// Value type of a field (`int`, `res.partner`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_text: Option<String>,
    /// Parameter list of a callable, e.g. `(self, force)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_text: Option<String>,
    /// Model that declares the member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl CompletionItem {
    /// Displayed signature: parameter list for callables, type text for
    /// fields, empty when neither is known.
    pub fn signature(&self) -> String {
        match (&self.tail_text, &self.type_text) {
            (Some(tail), _) => tail.clone(),
            (None, Some(ty)) => ty.clone(),
            (None, None) => String::new(),
        }
    }
}

/// A model class paired with a record-set variant.
///
/// Instances are canonical: [`ModelClass::model_type`] returns the same
/// `Arc` for the same variant for as long as the class is valid, so
/// `Arc::ptr_eq` is type identity.
pub struct ModelType {
    class: Arc<ModelClass>,
    variant: RecordSetVariant,
}

impl ModelType {
    pub(crate) fn new(class: Arc<ModelClass>, variant: RecordSetVariant) -> Self {
        Self { class, variant }
    }

    /// Canonical type for `class` and `variant`.
    pub fn create(class: &Arc<ModelClass>, variant: RecordSetVariant) -> Result<Arc<ModelType>> {
        class.model_type(variant)
    }

    pub fn class(&self) -> &Arc<ModelClass> {
        &self.class
    }

    pub fn name(&self) -> &str {
        self.class.name()
    }

    pub fn variant(&self) -> RecordSetVariant {
        self.variant
    }

    pub fn is_definition(&self) -> bool {
        self.variant.is_definition()
    }

    pub fn is_valid(&self) -> bool {
        self.class.is_valid()
    }

    pub fn assert_valid(&self) -> Result<()> {
        self.class.check_valid()
    }

    fn with_variant(&self, variant: RecordSetVariant) -> Result<Arc<ModelType>> {
        self.class.model_type(variant)
    }

    pub fn to_singleton_variant(&self) -> Result<Arc<ModelType>> {
        self.with_variant(RecordSetVariant::Singleton)
    }

    pub fn to_collection_variant(&self) -> Result<Arc<ModelType>> {
        self.with_variant(RecordSetVariant::Collection)
    }

    pub fn to_instance(&self) -> Result<Arc<ModelType>> {
        self.with_variant(self.variant.to_instance())
    }

    pub fn to_class(&self) -> Result<Arc<ModelType>> {
        self.with_variant(self.variant.to_class())
    }

    /// Type of the items produced by iterating this record set; absent for
    /// the class definition.
    pub fn iterated_item_type(&self) -> Result<Option<Arc<ModelType>>> {
        self.assert_valid()?;
        self.variant
            .iterated_item()
            .map(|v| self.with_variant(v))
            .transpose()
    }

    /// Resolve `name` on this type. Callables are bound to `self` so a
    /// method reached through a collection keeps the collection receiver.
    /// Falls back to fields of delegated models.
    pub fn member_lookup(
        self: &Arc<Self>,
        name: &str,
        ctx: &mut EvalContext,
    ) -> Result<Option<ResolvedMember>> {
        if let Some(symbol) = self.class.find_member(name, ctx)? {
            let resolved = if symbol.member().is_method() {
                ResolvedMember::Method(BoundMethod {
                    symbol,
                    receiver: Arc::clone(self),
                })
            } else {
                ResolvedMember::Field(symbol)
            };
            return Ok(Some(resolved));
        }

        Ok(self
            .class
            .find_delegated_field(name, ctx)?
            .map(|(symbol, via)| ResolvedMember::Delegated { symbol, via }))
    }

    /// Value type of a field symbol.
    pub fn field_type(&self, field: &Symbol) -> Result<Option<ValueType>> {
        match field.field_kind() {
            Some(kind) => self.kind_type(kind),
            None => Ok(None),
        }
    }

    fn kind_type(&self, kind: &FieldKind) -> Result<Option<ValueType>> {
        let primitive = match kind {
            FieldKind::Boolean => PrimitiveType::Bool,
            FieldKind::Integer => PrimitiveType::Int,
            FieldKind::Float | FieldKind::Monetary => PrimitiveType::Float,
            FieldKind::Char | FieldKind::Text | FieldKind::Selection => PrimitiveType::Str,
            FieldKind::Date => PrimitiveType::Date,
            FieldKind::Datetime => PrimitiveType::Datetime,
            FieldKind::Many2one(comodel) => {
                return self.related(comodel, RecordSetVariant::Singleton);
            }
            FieldKind::One2many(comodel) | FieldKind::Many2many(comodel) => {
                return self.related(comodel, RecordSetVariant::Collection);
            }
            FieldKind::Unknown(_) => return Ok(None),
        };
        Ok(Some(ValueType::Primitive(primitive)))
    }

    fn related(&self, comodel: &str, variant: RecordSetVariant) -> Result<Option<ValueType>> {
        let class = self.class.sibling(comodel)?;
        Ok(Some(ValueType::Model(class.model_type(variant)?)))
    }

    /// Type of the dotted field `path`. A trailing `id` segment after a
    /// relational field (or on its own) yields `int`.
    pub fn field_path_type(&self, path: &str, ctx: &mut EvalContext) -> Result<Option<ValueType>> {
        let names: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        self.field_path_type_of(&names, ctx)
    }

    pub fn field_path_type_of(&self, names: &[&str], ctx: &mut EvalContext) -> Result<Option<ValueType>> {
        self.assert_valid()?;
        let (names, to_id) = match names.split_last() {
            Some((&ID, rest)) => (rest, true),
            Some(_) => (names, false),
            None => return Ok(None),
        };
        if to_id && names.is_empty() {
            return Ok(Some(ValueType::Primitive(PrimitiveType::Int)));
        }

        let Some(field) = self.class.find_field_by_path(names, ctx)? else {
            return Ok(None);
        };
        let ty = self.field_type(&field)?;
        if !to_id {
            return Ok(ty);
        }
        Ok(match ty {
            Some(ValueType::Model(_)) => Some(ValueType::Primitive(PrimitiveType::Int)),
            _ => None,
        })
    }

    /// Every ancestor class as a type with this variant, self first.
    pub fn ancestor_types(&self, ctx: &mut EvalContext) -> Result<Vec<Arc<ModelType>>> {
        self.class
            .ancestor_chain(ctx)?
            .iter()
            .map(|class| class.model_type(self.variant))
            .collect()
    }

    pub fn super_types(&self, ctx: &mut EvalContext) -> Result<Vec<Arc<ModelType>>> {
        let mut types = self.ancestor_types(ctx)?;
        types.remove(0);
        Ok(types)
    }

    /// Names of every member visible through the ancestor chain.
    pub fn member_names(&self, ctx: &mut EvalContext) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for class in self.class.ancestor_chain(ctx)?.iter() {
            for decl in class.declarations()? {
                names.extend(decl.members.iter().map(|m| m.name.clone()));
            }
        }
        Ok(names)
    }

    /// Completion entries in lookup priority order: the `id` pseudo-field,
    /// ancestor members, then fields promoted from delegated models.
    pub fn completion_candidates(&self, ctx: &mut EvalContext) -> Result<Vec<CompletionItem>> {
        let mut seen: HashSet<String> = HashSet::from([ID.to_string()]);
        let mut items = vec![CompletionItem {
            name: ID.to_string(),
            kind: CompletionKind::Identifier,
            type_text: Some(PrimitiveType::Int.as_str().to_string()),
            tail_text: None,
            model: None,
        }];

        for class in self.class.ancestor_chain(ctx)?.iter() {
            for decl in class.declarations()?.iter().rev() {
                self.push_declared(decl, false, &mut seen, &mut items)?;
            }
        }

        for child in self.class.delegation_children()?.iter() {
            for class in child.class.ancestor_chain(ctx)?.iter() {
                for decl in class.declarations()?.iter().rev() {
                    self.push_declared(decl, true, &mut seen, &mut items)?;
                }
            }
        }
        Ok(items)
    }

    fn push_declared(
        &self,
        decl: &Declaration,
        delegated: bool,
        seen: &mut HashSet<String>,
        items: &mut Vec<CompletionItem>,
    ) -> Result<()> {
        for member in &decl.members {
            if delegated && !member.is_field() {
                continue;
            }
            if !seen.insert(member.name.clone()) {
                continue;
            }
            // last occurrence within one declaration wins
            let member = decl.member(&member.name).unwrap_or(member);
            items.push(self.completion_item(member, decl, delegated)?);
        }
        Ok(())
    }

    fn completion_item(
        &self,
        member: &Member,
        decl: &Declaration,
        delegated: bool,
    ) -> Result<CompletionItem> {
        let (kind, type_text, tail_text) = match &member.kind {
            MemberKind::Field { kind } => {
                let type_text = self.kind_type(kind)?.map(|ty| ty.type_text());
                let completion_kind = if delegated {
                    CompletionKind::DelegatedField
                } else {
                    CompletionKind::Field
                };
                (completion_kind, type_text, None)
            }
            MemberKind::Method { params } => (
                CompletionKind::Method,
                None,
                Some(format!("({})", params.join(", "))),
            ),
        };
        Ok(CompletionItem {
            name: member.name.clone(),
            kind,
            type_text,
            tail_text,
            model: decl.model.clone(),
        })
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("model", &self.name())
            .field("variant", &self.variant)
            .finish()
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name(), self.variant)
    }
}
