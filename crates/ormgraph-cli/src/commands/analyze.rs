use std::collections::BTreeSet;
use std::path::Path;

use crate::load_project;

/// Edge kinds between models, in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EdgeKind {
    Extends,
    Delegates,
    Relation,
}

impl EdgeKind {
    fn label(self) -> &'static str {
        match self {
            EdgeKind::Extends => "extends",
            EdgeKind::Delegates => "delegates",
            EdgeKind::Relation => "rel",
        }
    }

    fn dot_style(self) -> &'static str {
        match self {
            EdgeKind::Extends => "style=dashed, color=blue",
            EdgeKind::Delegates => "style=bold, color=darkgreen",
            EdgeKind::Relation => "color=black",
        }
    }
}

type Edge = (String, String, EdgeKind);

pub fn run_analyze(input_path: &Path, format: &str) -> Result<String, String> {
    let loaded = load_project(input_path)?;
    let snapshot = loaded.project.snapshot();
    let registry = snapshot.registry();
    let graph = snapshot.graph();

    let names: Vec<&str> = registry.model_names().iter().map(String::as_str).collect();
    let mut edges: BTreeSet<Edge> = BTreeSet::new();

    for &model in &names {
        for decl in registry.declarations_for(model) {
            for parent in &decl.extends {
                if parent != model && registry.contains(parent) {
                    edges.insert((model.to_string(), parent.clone(), EdgeKind::Extends));
                }
            }
            for member in &decl.members {
                if let Some(comodel) = member.field_kind().and_then(|k| k.comodel()) {
                    if comodel != model && registry.contains(comodel) {
                        edges.insert((model.to_string(), comodel.to_string(), EdgeKind::Relation));
                    }
                }
            }
        }
        for delegation in graph.delegation_children(model) {
            edges.insert((model.to_string(), delegation.model, EdgeKind::Delegates));
        }
    }

    let edges: Vec<Edge> = edges.into_iter().collect();
    match format {
        "dot" => Ok(render_dot(&names, &edges)),
        _ => Ok(render_mermaid(&names, &edges)),
    }
}

/// Mermaid node ids cannot contain dots.
fn mermaid_id(name: &str) -> String {
    name.replace('.', "_")
}

fn render_mermaid(names: &[&str], edges: &[Edge]) -> String {
    let mut lines = vec!["graph LR".to_string()];

    for name in names {
        lines.push(format!("    {}[\"{name}\"]", mermaid_id(name)));
    }

    for (src, tgt, kind) in edges {
        let arrow = match kind {
            EdgeKind::Extends => "-.->",
            EdgeKind::Delegates => "==>",
            EdgeKind::Relation => "-->",
        };
        lines.push(format!(
            "    {} {arrow}|{}| {}",
            mermaid_id(src),
            kind.label(),
            mermaid_id(tgt)
        ));
    }

    lines.push(format!("%% {} nodes, {} edges", names.len(), edges.len()));
    lines.join("\n")
}

fn render_dot(names: &[&str], edges: &[Edge]) -> String {
    let mut lines = vec![
        "digraph ormgraph {".to_string(),
        "    rankdir=LR;".to_string(),
        "    node [shape=box, style=filled, fillcolor=lightyellow];".to_string(),
    ];

    for name in names {
        lines.push(format!("    \"{name}\";"));
    }

    for (src, tgt, kind) in edges {
        lines.push(format!(
            "    \"{src}\" -> \"{tgt}\" [label=\"{}\", {}];",
            kind.label(),
            kind.dot_style()
        ));
    }

    lines.push("}".to_string());
    lines.join("\n")
}
