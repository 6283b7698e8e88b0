//! ormgraph model linter — configurable rules for declaration quality.
//!
//! Rules inspect the merged view of a [`Project`] (ancestor chains and
//! delegation) rather than single declarations.

mod rules;

use ormgraph_core::Project;
pub use rules::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Lint severity (separate from validation diagnostics)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Error,
    Warning,
    Info,
}

// ---------------------------------------------------------------------------
// Lint diagnostic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintDiagnostic {
    pub rule: String,
    pub severity: LintSeverity,
    pub file: String,
    pub line: usize,
    pub col: usize,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Lint rule trait
// ---------------------------------------------------------------------------

pub trait LintRule: Send + Sync {
    /// Unique rule identifier (e.g., "naming-convention").
    fn id(&self) -> &str;

    fn description(&self) -> &str;

    fn default_severity(&self) -> LintSeverity;

    /// Run the rule against the current generation of `project`.
    fn check(&self, project: &Project) -> Vec<LintDiagnostic>;
}

// ---------------------------------------------------------------------------
// Lint configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Off,
    #[default]
    Warn,
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintConfig {
    #[serde(default)]
    pub rules: HashMap<String, RuleLevel>,
}

impl LintConfig {
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        !matches!(self.rules.get(rule_id), Some(RuleLevel::Off))
    }

    /// Configured severity for a rule, or its default.
    pub fn severity_for(&self, rule: &dyn LintRule) -> LintSeverity {
        match self.rules.get(rule.id()) {
            Some(RuleLevel::Error) => LintSeverity::Error,
            Some(RuleLevel::Warn) | Some(RuleLevel::Off) => LintSeverity::Warning,
            None => rule.default_severity(),
        }
    }
}

// ---------------------------------------------------------------------------
// Linter engine
// ---------------------------------------------------------------------------

pub struct Linter {
    rules: Vec<Box<dyn LintRule>>,
    config: LintConfig,
}

impl Linter {
    /// Create a linter with all built-in rules.
    pub fn new(config: LintConfig) -> Self {
        Self {
            rules: builtin_rules(),
            config,
        }
    }

    pub fn rules(&self) -> &[Box<dyn LintRule>] {
        &self.rules
    }

    /// Run all enabled rules.
    pub fn lint(&self, project: &Project) -> Vec<LintDiagnostic> {
        let mut diagnostics = Vec::new();

        for rule in &self.rules {
            if !self.config.is_enabled(rule.id()) {
                tracing::trace!(rule = rule.id(), "lint rule disabled");
                continue;
            }
            let severity = self.config.severity_for(rule.as_ref());
            let mut results = rule.check(project);
            for d in &mut results {
                d.severity = severity.clone();
            }
            diagnostics.extend(results);
        }

        diagnostics
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(LintConfig::default())
    }
}

fn builtin_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(NamingConventionRule),
        Box::new(ModelSizeRule::default()),
        Box::new(RelationComplexityRule::default()),
        Box::new(ShadowedDelegationRule),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
