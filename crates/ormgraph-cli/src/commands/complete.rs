use std::path::Path;

use ormgraph_core::{EvalContext, RecordSetVariant};

use crate::load_project;

pub fn run_complete(
    input_path: &Path,
    model: &str,
    variant: RecordSetVariant,
    format: &str,
) -> Result<String, String> {
    let loaded = load_project(input_path)?;
    let items = loaded
        .project
        .model_type(model, variant)
        .and_then(|ty| ty.completion_candidates(&mut EvalContext::new()))
        .map_err(|e| e.to_string())?;

    if format == "json" {
        return serde_json::to_string_pretty(&items)
            .map_err(|e| format!("JSON serialization error: {e}"));
    }

    let width = items.iter().map(|i| i.name.len()).max().unwrap_or(0);
    Ok(items
        .iter()
        .map(|item| format!("{:width$}  {}", item.name, item.signature()).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n"))
}
