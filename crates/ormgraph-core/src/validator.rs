use std::collections::{HashMap, HashSet};

use crate::graph::{EvalContext, ModelGraph};
use crate::project::Project;
use crate::registry::ModelRegistry;
use crate::types::*;

/// Validate the merged declaration set of a project.
pub fn validate_project(project: &Project, options: &ValidateOptions) -> ValidateResult {
    validate(project.snapshot().registry(), options)
}

/// Check a registry for unresolved references, malformed delegation and
/// extension cycles. Never fails: every problem becomes a diagnostic.
pub fn validate(registry: &ModelRegistry, options: &ValidateOptions) -> ValidateResult {
    let mut errors: Vec<Diagnostic> = Vec::new();
    let mut warnings: Vec<Diagnostic> = Vec::new();
    let graph = ModelGraph::new(registry);

    for decl in registry.declarations() {
        let Some(ref model) = decl.model else {
            // ORM-W002: declaration that contributes to no model
            warnings.push(warning(
                "ORM-W002",
                &decl.loc,
                format!(
                    "Declaration extends {} but names no model; it is ignored",
                    describe_parents(&decl.extends)
                ),
            ));
            continue;
        };

        // ORM-E001: extended model has no declarations
        for parent in &decl.extends {
            if parent != model && !registry.contains(parent) {
                errors.push(error(
                    "ORM-E001",
                    &decl.loc,
                    format!("Model \"{model}\" extends \"{parent}\" which is not declared"),
                ));
            }
        }

        // ORM-E002 / ORM-E003: delegation target and exposing field
        for delegation in &decl.delegates {
            if !registry.contains(&delegation.model) {
                errors.push(error(
                    "ORM-E002",
                    &decl.loc,
                    format!(
                        "Model \"{model}\" delegates to \"{}\" which is not declared",
                        delegation.model
                    ),
                ));
                continue;
            }
            if !has_delegation_field(&graph, model, delegation) {
                errors.push(error(
                    "ORM-E003",
                    &decl.loc,
                    format!(
                        "Delegation of \"{model}\" to \"{}\" needs field \"{}\" declared as Many2one({})",
                        delegation.model, delegation.field, delegation.model
                    ),
                ));
            }
        }

        validate_members(decl, model, registry, &mut errors, &mut warnings);
    }

    // ORM-E006: extension cycles between distinct models
    for cycle in graph.extension_cycles() {
        let loc = cycle
            .first()
            .and_then(|m| registry.declarations_for(m).first())
            .map(|d| d.loc.clone())
            .unwrap_or_default();
        errors.push(error(
            "ORM-E006",
            &loc,
            format!("Extension cycle detected: {}", cycle.join(" → ")),
        ));
    }

    // Strict mode warnings
    if options.strict {
        for model in registry.model_names() {
            check_kind_conflicts(registry, model, &mut warnings);
        }
    }

    tracing::debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        "validation finished"
    );
    ValidateResult { errors, warnings }
}

fn validate_members(
    decl: &Declaration,
    model: &str,
    registry: &ModelRegistry,
    errors: &mut Vec<Diagnostic>,
    warnings: &mut Vec<Diagnostic>,
) {
    let mut seen: HashSet<&str> = HashSet::new();
    for member in &decl.members {
        // ORM-E005: duplicate member in one declaration
        if !seen.insert(member.name.as_str()) {
            errors.push(error(
                "ORM-E005",
                &member.loc,
                format!(
                    "Duplicate member \"{}\" in declaration of \"{model}\"",
                    member.name
                ),
            ));
        }

        match member.field_kind() {
            // ORM-E004: relational field to an undeclared model
            Some(kind) if kind.is_relational() => {
                if let Some(comodel) = kind.comodel() {
                    if !registry.contains(comodel) {
                        errors.push(error(
                            "ORM-E004",
                            &member.loc,
                            format!(
                                "Field \"{}\" of \"{model}\" references \"{comodel}\" which is not declared",
                                member.name
                            ),
                        ));
                    }
                }
            }
            // ORM-W001: unrecognised kind text
            Some(FieldKind::Unknown(raw)) => {
                warnings.push(warning(
                    "ORM-W001",
                    &member.loc,
                    if raw.is_empty() {
                        format!("Member \"{}\" of \"{model}\" has no field kind", member.name)
                    } else {
                        format!(
                            "Unknown field kind \"{raw}\" for \"{}\" of \"{model}\"",
                            member.name
                        )
                    },
                ));
            }
            _ => {}
        }
    }
}

/// True when `delegation.field` is visible on `model` as a Many2one to the
/// delegated model.
fn has_delegation_field(graph: &ModelGraph<'_>, model: &str, delegation: &Delegation) -> bool {
    let chain = graph.ancestor_chain(model, &mut EvalContext::new());
    let field = chain.names.iter().find_map(|name| {
        graph
            .registry()
            .declarations_for(name)
            .iter()
            .rev()
            .find_map(|d| d.member(&delegation.field))
    });
    matches!(
        field.and_then(Member::field_kind),
        Some(FieldKind::Many2one(target)) if *target == delegation.model
    )
}

fn check_kind_conflicts(registry: &ModelRegistry, model: &str, warnings: &mut Vec<Diagnostic>) {
    let mut kinds: HashMap<&str, (bool, &Member)> = HashMap::new();
    for decl in registry.declarations_for(model) {
        for member in &decl.members {
            match kinds.get(member.name.as_str()) {
                Some((is_field, first)) if *is_field != member.is_field() => {
                    // ORM-W003: field in one declaration, callable in another
                    warnings.push(warning(
                        "ORM-W003",
                        &member.loc,
                        format!(
                            "\"{}\" of \"{model}\" is declared as a {} here and as a {} at {}:{}",
                            member.name,
                            kind_label(member.is_field()),
                            kind_label(*is_field),
                            first.loc.file,
                            first.loc.line
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    kinds.insert(&member.name, (member.is_field(), member));
                }
            }
        }
    }
}

fn kind_label(is_field: bool) -> &'static str {
    if is_field {
        "field"
    } else {
        "method"
    }
}

fn describe_parents(extends: &[String]) -> String {
    match extends {
        [] => "nothing".to_string(),
        parents => parents
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn error(code: &str, loc: &SourceLocation, message: String) -> Diagnostic {
    Diagnostic {
        code: code.into(),
        severity: DiagnosticSeverity::Error,
        file: loc.file.clone(),
        line: loc.line,
        col: loc.col.max(1),
        message,
    }
}

fn warning(code: &str, loc: &SourceLocation, message: String) -> Diagnostic {
    Diagnostic {
        severity: DiagnosticSeverity::Warning,
        ..error(code, loc, message)
    }
}
