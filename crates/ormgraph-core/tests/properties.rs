use std::collections::HashSet;
use std::sync::Arc;

use ormgraph_core::{parse_string, EvalContext, Project, RecordSetVariant};
use proptest::prelude::*;

/// Render models `m0..m{n}` where each edge `(a, b)` makes `m{a}` extend
/// `m{b}`. Targets at or past `models` name undeclared models. Every declared
/// model carries one field named after itself.
fn source(models: usize, edges: &[(usize, usize)]) -> String {
    let mut out = String::new();
    for i in 0..models {
        let parents: Vec<String> = edges
            .iter()
            .filter(|(from, _)| *from == i)
            .map(|(_, to)| format!("m{to}"))
            .collect();
        if parents.is_empty() {
            out.push_str(&format!("## m{i}\n"));
        } else {
            out.push_str(&format!("## m{i} : {}\n", parents.join(", ")));
        }
        out.push_str(&format!("- f{i}: Char\n\n"));
    }
    out
}

fn chain(p: &Project, model: &str) -> Vec<String> {
    p.model_class(model)
        .ancestor_chain(&mut EvalContext::new())
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}

fn variant() -> impl Strategy<Value = RecordSetVariant> {
    prop::sample::select(RecordSetVariant::ALL.to_vec())
}

proptest! {
    #[test]
    fn ancestor_chains_are_finite_and_closed(
        models in 1usize..8,
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..16),
    ) {
        let p = Project::new(vec![parse_string(&source(models, &edges), "gen.models.md")]);
        for i in 0..models {
            let name = format!("m{i}");
            let names = chain(&p, &name);
            prop_assert_eq!(&names[0], &name);

            let unique: HashSet<&String> = names.iter().collect();
            prop_assert_eq!(unique.len(), names.len());

            for (_, to) in edges.iter().filter(|(from, _)| *from == i) {
                let parent = format!("m{to}");
                prop_assert!(names.contains(&parent));
                for ancestor in chain(&p, &parent) {
                    prop_assert!(names.contains(&ancestor));
                }
            }
        }
    }

    #[test]
    fn every_ancestor_field_resolves(
        models in 1usize..6,
        edges in prop::collection::vec((0usize..6, 0usize..6), 0..10),
        v in variant(),
    ) {
        let p = Project::new(vec![parse_string(&source(models, &edges), "gen.models.md")]);
        for i in 0..models {
            let ty = p.model_type(&format!("m{i}"), v).unwrap();
            let mut ctx = EvalContext::new();
            for ancestor in chain(&p, &format!("m{i}")) {
                let index: usize = ancestor[1..].parse().unwrap();
                let field = format!("f{index}");
                let found = ty.member_lookup(&field, &mut ctx).unwrap().is_some();
                prop_assert_eq!(found, index < models);
            }
            prop_assert!(ctx.is_idle());
        }
    }

    #[test]
    fn model_types_are_canonical(v in variant(), w in variant()) {
        let p = Project::new(vec![parse_string("## a\n## b : a", "gen.models.md")]);
        let first = p.model_type("b", v).unwrap();
        let second = p.model_type("b", v).unwrap();
        prop_assert!(Arc::ptr_eq(&first, &second));

        let other = p.model_type("b", w).unwrap();
        prop_assert_eq!(Arc::ptr_eq(&first, &other), v == w);
        prop_assert!(Arc::ptr_eq(&other.to_class().unwrap(), &p.model_type("b", RecordSetVariant::Definition).unwrap()));
    }
}
