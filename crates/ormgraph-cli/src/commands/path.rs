use std::path::Path;

use ormgraph_core::{EvalContext, RecordSetVariant};

use crate::{load_project, require_model};

pub fn run_path(
    input_path: &Path,
    model: &str,
    field_path: &str,
    variant: RecordSetVariant,
) -> Result<String, String> {
    let loaded = load_project(input_path)?;
    require_model(&loaded.project, model)?;

    let ty = loaded
        .project
        .model_type(model, variant)
        .map_err(|e| e.to_string())?;
    match ty
        .field_path_type(field_path, &mut EvalContext::new())
        .map_err(|e| e.to_string())?
    {
        Some(value) => Ok(value.to_string()),
        None => Err(format!(
            "Field path \"{field_path}\" does not resolve on \"{model}\""
        )),
    }
}
