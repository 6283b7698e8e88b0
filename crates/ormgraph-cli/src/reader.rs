use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ormgraph_core::{parse_string, ParsedModule};
use ormgraph_lint::LintConfig;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "ormgraph.config.yaml";

const MARKDOWN_SUFFIX: &str = ".models.md";
const JSON_SUFFIX: &str = ".models.json";

/// A declaration source with its path and content.
pub struct ModelFile {
    pub path: String,
    pub content: String,
}

impl ModelFile {
    /// Parse markdown sources; JSON sources hold an already parsed module.
    pub fn parse(&self) -> Result<ParsedModule, String> {
        if self.path.ends_with(JSON_SUFFIX) {
            return serde_json::from_str(&self.content)
                .map_err(|e| format!("Invalid module JSON in {}: {e}", self.path));
        }
        Ok(parse_string(&self.content, &self.path))
    }
}

/// Project configuration from ormgraph.config.yaml.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Glob patterns relative to the config directory; order is load order.
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub lint: LintConfig,
}

/// Read declaration files from a path (file or directory).
pub fn read_model_files(input_path: &Path) -> Result<Vec<ModelFile>, String> {
    if !input_path.exists() {
        return Err(format!("Path does not exist: {}", input_path.display()));
    }

    if input_path.is_file() {
        return Ok(vec![read_file(input_path)?]);
    }

    if input_path.is_dir() {
        return match read_project_config(input_path)? {
            Some(ProjectConfig {
                sources: Some(patterns),
                ..
            }) if !patterns.is_empty() => read_from_patterns(input_path, &patterns),
            _ => scan_directory(input_path),
        };
    }

    Err(format!(
        "Path is neither a file nor a directory: {}",
        input_path.display()
    ))
}

/// Project config of a directory, if it has one.
pub fn read_project_config(dir_path: &Path) -> Result<Option<ProjectConfig>, String> {
    let config_path = dir_path.join(CONFIG_FILE);
    if !config_path.is_file() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(&config_path).map_err(|e| format!("Failed to read config: {e}"))?;
    let config = serde_yaml::from_str(&content)
        .map_err(|e| format!("Invalid YAML config {}: {e}", config_path.display()))?;
    tracing::debug!(path = %config_path.display(), "project config loaded");
    Ok(Some(config))
}

fn scan_directory(dir_path: &Path) -> Result<Vec<ModelFile>, String> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for suffix in [MARKDOWN_SUFFIX, JSON_SUFFIX] {
        let pattern = dir_path.join(format!("**/*{suffix}"));
        let pattern_str = pattern.to_string_lossy().replace('\\', "/");
        let entries = glob::glob(&pattern_str).map_err(|e| format!("Invalid glob pattern: {e}"))?;

        for entry in entries {
            let path = entry.map_err(|e| format!("Glob error: {e}"))?;
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    paths.sort();
    paths.iter().map(|p| read_file(p)).collect()
}

fn read_from_patterns(base_dir: &Path, patterns: &[String]) -> Result<Vec<ModelFile>, String> {
    let mut files: Vec<ModelFile> = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for pattern in patterns {
        let full_pattern = base_dir.join(pattern);
        let pattern_str = full_pattern.to_string_lossy().replace('\\', "/");
        let entries = glob::glob(&pattern_str)
            .map_err(|e| format!("Invalid glob pattern '{pattern}': {e}"))?;

        let mut matched: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| format!("Glob error: {e}"))?;
            if seen.insert(path.clone()) {
                matched.push(path);
            }
        }
        matched.sort();

        for path in matched {
            files.push(read_file(&path)?);
        }
    }

    Ok(files)
}

fn read_file(path: &Path) -> Result<ModelFile, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(ModelFile {
        path: path.to_string_lossy().to_string(),
        content,
    })
}
