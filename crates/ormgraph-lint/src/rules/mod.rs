//! Built-in lint rules.

pub mod model_size;
pub mod naming_convention;
pub mod relation_complexity;
pub mod shadowed_delegation;

pub use model_size::ModelSizeRule;
pub use naming_convention::NamingConventionRule;
pub use relation_complexity::RelationComplexityRule;
pub use shadowed_delegation::ShadowedDelegationRule;

use std::collections::HashSet;

use ormgraph_core::{EvalContext, Member, ModelGraph, SourceLocation};

/// Fields visible on `model` through its ancestor chain, first occurrence
/// of each name in lookup order.
pub(crate) fn visible_fields<'a>(graph: &ModelGraph<'a>, model: &str) -> Vec<&'a Member> {
    let registry = graph.registry();
    let chain = graph.ancestor_chain(model, &mut EvalContext::new());
    let mut seen: HashSet<&str> = HashSet::new();
    let mut fields = Vec::new();
    for name in &chain.names {
        for decl in registry.declarations_for(name).iter().rev() {
            for member in decl.members.iter().rev() {
                if seen.insert(member.name.as_str()) && member.is_field() {
                    fields.push(member);
                }
            }
        }
    }
    fields
}

/// Location of the first declaration of `model`.
pub(crate) fn model_loc(graph: &ModelGraph<'_>, model: &str) -> SourceLocation {
    graph
        .registry()
        .declarations_for(model)
        .first()
        .map(|d| d.loc.clone())
        .unwrap_or_default()
}
