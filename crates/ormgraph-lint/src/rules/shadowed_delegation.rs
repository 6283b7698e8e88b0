//! Rule: shadowed-delegation
//!
//! A field declared on a model hides the field of the same name promoted
//! from a delegated model; the delegated one is then only reachable through
//! the delegation field.

use std::collections::HashSet;

use ormgraph_core::Project;

use super::visible_fields;
use crate::{LintDiagnostic, LintRule, LintSeverity};

pub struct ShadowedDelegationRule;

impl LintRule for ShadowedDelegationRule {
    fn id(&self) -> &str {
        "shadowed-delegation"
    }

    fn description(&self) -> &str {
        "Fields should not hide fields of delegated models"
    }

    fn default_severity(&self) -> LintSeverity {
        LintSeverity::Warning
    }

    fn check(&self, project: &Project) -> Vec<LintDiagnostic> {
        let mut diagnostics = Vec::new();
        let snapshot = project.snapshot();
        let graph = snapshot.graph();

        for model in snapshot.registry().model_names() {
            let delegations = graph.delegation_children(model);
            if delegations.is_empty() {
                continue;
            }
            let own = visible_fields(&graph, model);

            for delegation in &delegations {
                let delegated: HashSet<&str> = visible_fields(&graph, &delegation.model)
                    .into_iter()
                    .map(|m| m.name.as_str())
                    .collect();
                for field in own.iter().filter(|f| delegated.contains(f.name.as_str())) {
                    diagnostics.push(LintDiagnostic {
                        rule: self.id().into(),
                        severity: self.default_severity(),
                        file: field.loc.file.clone(),
                        line: field.loc.line,
                        col: field.loc.col,
                        message: format!(
                            "Field \"{}\" of \"{model}\" hides \"{}.{}\" delegated through \"{}\"",
                            field.name, delegation.model, field.name, delegation.field
                        ),
                    });
                }
            }
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ormgraph_core::parse_string;

    fn check(input: &str) -> Vec<LintDiagnostic> {
        let project = Project::new(vec![parse_string(input, "test.models.md")]);
        ShadowedDelegationRule.check(&project)
    }

    #[test]
    fn detects_shadowed_field() {
        let results = check(
            "## res.partner\n- name: Char\n- email: Char\n## res.users\n- name: Char\n- partner_id: Many2one(res.partner)\n### Delegates\n- res.partner: partner_id",
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].line, 5);
        assert!(results[0].message.contains("res.partner.name"));
    }

    #[test]
    fn distinct_fields_are_fine() {
        let results = check(
            "## res.partner\n- email: Char\n## res.users\n- login: Char\n### Delegates\n- res.partner: partner_id",
        );
        assert!(results.is_empty());
    }
}
