use std::path::Path;

use ormgraph_lint::{LintDiagnostic, LintSeverity, Linter};

use crate::load_project;

pub fn run_lint(input_path: &Path, format: &str) -> Result<String, String> {
    let loaded = load_project(input_path)?;

    let linter = Linter::new(loaded.config.lint.clone());
    let results = linter.lint(&loaded.project);
    let file_count = loaded.files.len();

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&serde_json::json!({
                "diagnostics": results,
                "summary": {
                    "count": results.len(),
                    "files": file_count,
                }
            }))
            .map_err(|e| format!("JSON serialization error: {e}"))?;
            Ok(json)
        }
        "sarif" => {
            let sarif = build_sarif(&results, &linter);
            serde_json::to_string_pretty(&sarif)
                .map_err(|e| format!("SARIF serialization error: {e}"))
        }
        _ => {
            let mut lines: Vec<String> = results
                .iter()
                .map(|d| {
                    format!(
                        "{}:{}:{} {}[{}]: {}",
                        d.file,
                        d.line,
                        d.col,
                        severity_word(&d.severity),
                        d.rule,
                        d.message
                    )
                })
                .collect();

            let count = results.len();
            let issue_word = if count == 1 { "issue" } else { "issues" };
            let file_word = if file_count == 1 { "file" } else { "files" };
            lines.push(format!(
                "{count} lint {issue_word} in {file_count} {file_word}."
            ));

            Ok(lines.join("\n"))
        }
    }
}

fn severity_word(severity: &LintSeverity) -> &'static str {
    match severity {
        LintSeverity::Error => "error",
        LintSeverity::Warning => "warning",
        LintSeverity::Info => "info",
    }
}

fn sarif_level(severity: &LintSeverity) -> &'static str {
    match severity {
        LintSeverity::Error => "error",
        LintSeverity::Warning => "warning",
        LintSeverity::Info => "note",
    }
}

fn build_sarif(results: &[LintDiagnostic], linter: &Linter) -> serde_json::Value {
    let rule_descriptors: Vec<serde_json::Value> = linter
        .rules()
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r.id(),
                "shortDescription": { "text": r.description() },
                "defaultConfiguration": { "level": sarif_level(&r.default_severity()) }
            })
        })
        .collect();

    let sarif_results: Vec<serde_json::Value> = results
        .iter()
        .map(|d| {
            serde_json::json!({
                "ruleId": d.rule,
                "level": sarif_level(&d.severity),
                "message": { "text": d.message },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": { "uri": d.file },
                        "region": {
                            "startLine": d.line,
                            "startColumn": d.col
                        }
                    }
                }]
            })
        })
        .collect();

    serde_json::json!({
        "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "ormgraph-lint",
                    "version": env!("CARGO_PKG_VERSION"),
                    "rules": rule_descriptors
                }
            },
            "results": sarif_results
        }]
    })
}
