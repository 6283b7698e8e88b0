use std::path::Path;

use ormgraph_core::{EvalContext, RecordSetVariant};

use crate::{load_project, require_model};

pub fn run_inspect(input_path: &Path, model: &str, variant: RecordSetVariant) -> Result<String, String> {
    let loaded = load_project(input_path)?;
    require_model(&loaded.project, model)?;

    let ty = loaded
        .project
        .model_type(model, variant)
        .map_err(|e| e.to_string())?;
    let class = ty.class();
    let mut ctx = EvalContext::new();

    let ancestors: Vec<String> = ty
        .super_types(&mut ctx)
        .map_err(|e| e.to_string())?
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    let delegates = class.delegation_children().map_err(|e| e.to_string())?;
    let declarations = class.declarations().map_err(|e| e.to_string())?;
    let members = ty.completion_candidates(&mut ctx).map_err(|e| e.to_string())?;

    let mut lines = vec![format!("{ty}")];

    lines.push(format!(
        "extends: {}",
        if ancestors.is_empty() {
            "-".to_string()
        } else {
            ancestors.join(", ")
        }
    ));

    if !delegates.is_empty() {
        lines.push("delegates:".to_string());
        for child in delegates.iter() {
            lines.push(format!("  {} via {}", child.class.name(), child.field));
        }
    }

    lines.push(format!("declarations ({}):", declarations.len()));
    for decl in &declarations {
        let description = decl
            .description
            .as_deref()
            .map(|d| format!(" {d}"))
            .unwrap_or_default();
        lines.push(format!(
            "  {}:{} [{}]{description}",
            decl.loc.file, decl.loc.line, decl.module
        ));
    }

    lines.push(format!("members ({}):", members.len()));
    for item in &members {
        let signature = item.signature();
        let owner = item.model.as_deref().unwrap_or("builtin");
        if signature.is_empty() {
            lines.push(format!("  {} ({owner})", item.name));
        } else if signature.starts_with('(') {
            lines.push(format!("  {}{signature} ({owner})", item.name));
        } else {
            lines.push(format!("  {}: {signature} ({owner})", item.name));
        }
    }

    Ok(lines.join("\n"))
}
