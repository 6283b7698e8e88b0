//! Rule: model-size
//!
//! Warns when a merged model exposes too many fields (default threshold: 60).
//! Fields contributed by every declaration and ancestor count.

use ormgraph_core::Project;

use super::{model_loc, visible_fields};
use crate::{LintDiagnostic, LintRule, LintSeverity};

const DEFAULT_MAX_FIELDS: usize = 60;

pub struct ModelSizeRule {
    pub max_fields: usize,
}

impl Default for ModelSizeRule {
    fn default() -> Self {
        Self {
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl LintRule for ModelSizeRule {
    fn id(&self) -> &str {
        "model-size"
    }

    fn description(&self) -> &str {
        "Models should not expose too many fields"
    }

    fn default_severity(&self) -> LintSeverity {
        LintSeverity::Warning
    }

    fn check(&self, project: &Project) -> Vec<LintDiagnostic> {
        let mut diagnostics = Vec::new();
        let snapshot = project.snapshot();
        let graph = snapshot.graph();

        for model in snapshot.registry().model_names() {
            let count = visible_fields(&graph, model).len();
            if count > self.max_fields {
                let loc = model_loc(&graph, model);
                diagnostics.push(LintDiagnostic {
                    rule: self.id().into(),
                    severity: self.default_severity(),
                    file: loc.file,
                    line: loc.line,
                    col: 1,
                    message: format!(
                        "Model \"{model}\" has {count} fields (max {}). Consider splitting it or moving fields to a mixin",
                        self.max_fields
                    ),
                });
            }
        }

        diagnostics
    }
}
