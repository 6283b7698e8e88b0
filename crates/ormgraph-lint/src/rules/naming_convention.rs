//! Rule: naming-convention
//!
//! Model names are dotted lowercase identifiers (`sale.order.line`), member
//! names are snake_case, and relational fields carry the usual suffixes:
//! `_id` for Many2one, `_ids` for One2many and Many2many.

use ormgraph_core::{FieldKind, Member, Project};

use crate::{LintDiagnostic, LintRule, LintSeverity};

pub struct NamingConventionRule;

impl LintRule for NamingConventionRule {
    fn id(&self) -> &str {
        "naming-convention"
    }

    fn description(&self) -> &str {
        "Model names should be dotted lowercase, members snake_case with relational suffixes"
    }

    fn default_severity(&self) -> LintSeverity {
        LintSeverity::Warning
    }

    fn check(&self, project: &Project) -> Vec<LintDiagnostic> {
        let mut diagnostics = Vec::new();
        let snapshot = project.snapshot();

        for decl in snapshot.registry().declarations() {
            let Some(ref model) = decl.model else {
                continue;
            };
            // In-place extensions repeat the name; report it where it is declared
            if !decl.extends.contains(model) && !is_dotted_lowercase(model) {
                diagnostics.push(LintDiagnostic {
                    rule: self.id().into(),
                    severity: self.default_severity(),
                    file: decl.loc.file.clone(),
                    line: decl.loc.line,
                    col: 1,
                    message: format!(
                        "Model name \"{model}\" should be lowercase dot-separated (e.g. \"sale.order\")"
                    ),
                });
            }

            for member in &decl.members {
                if let Some(message) = member_problem(member) {
                    diagnostics.push(LintDiagnostic {
                        rule: self.id().into(),
                        severity: self.default_severity(),
                        file: member.loc.file.clone(),
                        line: member.loc.line,
                        col: member.loc.col,
                        message,
                    });
                }
            }
        }

        diagnostics
    }
}

fn member_problem(member: &Member) -> Option<String> {
    let name = member.name.as_str();
    if !is_snake_case(name) {
        return Some(format!("Member name \"{name}\" should be snake_case"));
    }
    match member.field_kind()? {
        FieldKind::Many2one(_) if !name.ends_with("_id") => Some(format!(
            "Many2one field \"{name}\" should end with \"_id\""
        )),
        FieldKind::One2many(_) | FieldKind::Many2many(_) if !name.ends_with("_ids") => {
            Some(format!("To-many field \"{name}\" should end with \"_ids\""))
        }
        _ => None,
    }
}

/// Dot-separated segments, each a lowercase snake_case identifier.
fn is_dotted_lowercase(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_snake_case)
}

/// Lowercase letters, digits and underscores, not starting with a digit.
fn is_snake_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use ormgraph_core::parse_string;

    fn check(input: &str) -> Vec<LintDiagnostic> {
        let project = Project::new(vec![parse_string(input, "test.models.md")]);
        NamingConventionRule.check(&project)
    }

    #[test]
    fn dotted_lowercase_valid() {
        assert!(is_dotted_lowercase("sale.order"));
        assert!(is_dotted_lowercase("res.partner.bank"));
        assert!(is_dotted_lowercase("account_move"));
    }

    #[test]
    fn dotted_lowercase_invalid() {
        assert!(!is_dotted_lowercase("Sale.Order"));
        assert!(!is_dotted_lowercase("sale..order"));
        assert!(!is_dotted_lowercase("sale.order."));
        assert!(!is_dotted_lowercase("2fa.device"));
    }

    #[test]
    fn snake_case_rules() {
        assert!(is_snake_case("partner_id"));
        assert!(is_snake_case("_compute_total"));
        assert!(!is_snake_case("partnerId"));
        assert!(!is_snake_case(""));
    }

    #[test]
    fn rule_detects_bad_model_name() {
        let results = check("## SaleOrder\n- name: Char");
        assert_eq!(results.len(), 1);
        assert!(results[0].message.contains("lowercase"));
    }

    #[test]
    fn rule_detects_relational_suffixes() {
        let results = check(
            "## sale.order\n- partner: Many2one(res.partner)\n- lines: One2many(sale.order.line)\n- tag_ids: Many2many(crm.tag)",
        );
        assert_eq!(results.len(), 2);
        assert!(results[0].message.contains("_id\""));
        assert!(results[1].message.contains("_ids\""));
    }

    #[test]
    fn rule_detects_bad_member_name() {
        let results = check("## sale.order\n- amountTotal: Monetary\n- doThing(self)");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|d| d.message.contains("snake_case")));
    }

    #[test]
    fn rule_no_warnings_for_correct_names() {
        let results = check(
            "## sale.order\n- partner_id: Many2one(res.partner)\n- order_line_ids: One2many(sale.order.line)\n- action_confirm(self)\n## : sale.order\n- note: Text",
        );
        assert!(results.is_empty(), "{results:?}");
    }
}
