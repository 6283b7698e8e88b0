//! Rule: relation-complexity
//!
//! Warns when a merged model has too many relational fields (default
//! threshold: 15).

use ormgraph_core::Project;

use super::{model_loc, visible_fields};
use crate::{LintDiagnostic, LintRule, LintSeverity};

const DEFAULT_MAX_RELATIONS: usize = 15;

pub struct RelationComplexityRule {
    pub max_relations: usize,
}

impl Default for RelationComplexityRule {
    fn default() -> Self {
        Self {
            max_relations: DEFAULT_MAX_RELATIONS,
        }
    }
}

impl LintRule for RelationComplexityRule {
    fn id(&self) -> &str {
        "relation-complexity"
    }

    fn description(&self) -> &str {
        "Models should not have too many relational fields"
    }

    fn default_severity(&self) -> LintSeverity {
        LintSeverity::Warning
    }

    fn check(&self, project: &Project) -> Vec<LintDiagnostic> {
        let mut diagnostics = Vec::new();
        let snapshot = project.snapshot();
        let graph = snapshot.graph();

        for model in snapshot.registry().model_names() {
            let relations = visible_fields(&graph, model)
                .into_iter()
                .filter(|m| m.field_kind().is_some_and(|k| k.is_relational()))
                .count();

            if relations > self.max_relations {
                let loc = model_loc(&graph, model);
                diagnostics.push(LintDiagnostic {
                    rule: self.id().into(),
                    severity: self.default_severity(),
                    file: loc.file,
                    line: loc.line,
                    col: 1,
                    message: format!(
                        "Model \"{model}\" has {relations} relational fields (max {}). Consider decomposing",
                        self.max_relations
                    ),
                });
            }
        }

        diagnostics
    }
}
