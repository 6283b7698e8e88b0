mod commands;
mod reader;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ormgraph_core::{
    validate_project, Diagnostic, DiagnosticSeverity, EvalContext, Project, RecordSetVariant,
    ValidateOptions, PARSER_VERSION,
};
use reader::{read_model_files, read_project_config, ProjectConfig};

#[derive(Parser)]
#[command(
    name = "ormgraph",
    version,
    about = "ormgraph model resolver — merge, validate and query ORM model declarations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse declaration files and output JSON
    Parse {
        /// Input path (file or directory, defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the merged model graph and report diagnostics
    Validate {
        /// Input path (file or directory, defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Also report member kind conflicts
        #[arg(long)]
        strict: bool,

        /// Output format: human (default) or json
        #[arg(long, default_value = "human")]
        format: String,
    },

    /// Lint model declarations for style and quality issues
    Lint {
        /// Input path (file or directory, defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format: human (default), json or sarif
        #[arg(long, default_value = "human")]
        format: String,
    },

    /// Output the extension, delegation and relation graph
    Analyze {
        /// Input path (file or directory, defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format: mermaid (default) or dot
        #[arg(long, default_value = "mermaid")]
        format: String,
    },

    /// Show the merged view of one model
    Inspect {
        /// Model name, e.g. sale.order
        model: String,

        /// Input path (file or directory, defaults to current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Record set variant: definition, unbound, singleton or collection
        #[arg(long, default_value = "unbound")]
        variant: RecordSetVariant,
    },

    /// List completion candidates for a model
    Complete {
        /// Model name, e.g. sale.order
        model: String,

        #[arg(long, default_value = ".")]
        path: PathBuf,

        #[arg(long, default_value = "unbound")]
        variant: RecordSetVariant,

        /// Output format: human (default) or json
        #[arg(long, default_value = "human")]
        format: String,
    },

    /// Resolve the type of a dotted field path
    Path {
        /// Model name, e.g. sale.order
        model: String,

        /// Dotted field path, e.g. partner_id.country_id.code
        field_path: String,

        #[arg(long, default_value = ".")]
        path: PathBuf,

        #[arg(long, default_value = "unbound")]
        variant: RecordSetVariant,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { path, output } => run_parse(&path, output.as_deref()).map(|json| {
            if output.is_none() {
                println!("{json}");
            }
        }),
        Commands::Validate {
            path,
            strict,
            format,
        } => run_validate(&path, strict, &format).map(|(output, error_count)| {
            println!("{output}");
            if error_count > 0 {
                process::exit(1);
            }
        }),
        Commands::Lint { path, format } => {
            commands::lint::run_lint(&path, &format).map(|output| println!("{output}"))
        }
        Commands::Analyze { path, format } => {
            commands::analyze::run_analyze(&path, &format).map(|output| println!("{output}"))
        }
        Commands::Inspect {
            model,
            path,
            variant,
        } => commands::inspect::run_inspect(&path, &model, variant)
            .map(|output| println!("{output}")),
        Commands::Complete {
            model,
            path,
            variant,
            format,
        } => commands::complete::run_complete(&path, &model, variant, &format)
            .map(|output| println!("{output}")),
        Commands::Path {
            model,
            field_path,
            path,
            variant,
        } => commands::path::run_path(&path, &model, &field_path, variant)
            .map(|output| println!("{output}")),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Log to stderr when ORMGRAPH_LOG is set (e.g. `ORMGRAPH_LOG=ormgraph_core=debug`).
fn init_tracing() {
    if let Ok(filter) = EnvFilter::try_from_env("ORMGRAPH_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Declaration files of an input path merged into one project.
pub struct LoadedProject {
    pub project: Project,
    pub config: ProjectConfig,
    pub files: Vec<String>,
}

pub fn load_project(input_path: &Path) -> Result<LoadedProject, String> {
    let files = read_model_files(input_path)?;

    if files.is_empty() {
        return Err(format!(
            "No model files (.models.md, .models.json) found at: {}",
            input_path.display()
        ));
    }

    let modules = files
        .iter()
        .map(|f| f.parse())
        .collect::<Result<Vec<_>, _>>()?;

    let config = if input_path.is_dir() {
        read_project_config(input_path)?.unwrap_or_default()
    } else {
        ProjectConfig::default()
    };

    tracing::debug!(files = files.len(), "declaration sources loaded");
    Ok(LoadedProject {
        project: Project::new(modules),
        config,
        files: files.into_iter().map(|f| f.path).collect(),
    })
}

/// Fail with a readable message for names that have no declarations.
pub fn require_model(project: &Project, model: &str) -> Result<(), String> {
    if project.snapshot().registry().contains(model) {
        Ok(())
    } else {
        Err(format!("Model \"{model}\" is not declared"))
    }
}

fn run_parse(input_path: &Path, output_file: Option<&Path>) -> Result<String, String> {
    let loaded = load_project(input_path)?;
    let snapshot = loaded.project.snapshot();
    let registry = snapshot.registry();
    let graph = snapshot.graph();

    let models: Vec<serde_json::Value> = registry
        .model_names()
        .iter()
        .map(|name| {
            let ancestors = graph.ancestor_chain(name, &mut EvalContext::new());
            serde_json::json!({
                "name": name,
                "ancestors": ancestors.names,
                "delegates": graph.delegation_children(name),
                "declarations": registry.declarations_for(name),
            })
        })
        .collect();
    let unattached: Vec<_> = registry
        .declarations()
        .iter()
        .filter(|d| d.model.is_none())
        .collect();

    let output = serde_json::json!({
        "parserVersion": PARSER_VERSION,
        "project": {
            "name": loaded.config.name,
            "version": loaded.config.version,
        },
        "sources": loaded.files,
        "models": models,
        "unattached": unattached,
    });
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| format!("JSON serialization error: {e}"))?;

    if let Some(out_path) = output_file {
        std::fs::write(out_path, &json)
            .map_err(|e| format!("Failed to write {}: {e}", out_path.display()))?;
        return Ok(format!("Written to {}", out_path.display()));
    }

    Ok(json)
}

fn run_validate(input_path: &Path, strict: bool, format: &str) -> Result<(String, usize), String> {
    let loaded = load_project(input_path)?;
    let result = validate_project(&loaded.project, &ValidateOptions { strict });

    let error_count = result.errors.len();
    let warning_count = result.warnings.len();
    let file_count = loaded.files.len();

    if format == "json" {
        let diagnostics: Vec<&Diagnostic> =
            result.errors.iter().chain(result.warnings.iter()).collect();
        let output = serde_json::json!({
            "diagnostics": diagnostics,
            "summary": {
                "errors": error_count,
                "warnings": warning_count,
                "files": file_count,
            }
        });
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        return Ok((json, error_count));
    }

    let mut lines: Vec<String> = Vec::new();

    for d in result.errors.iter().chain(result.warnings.iter()) {
        let severity = match d.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        lines.push(format!(
            "{}:{}:{} {}[{}]: {}",
            d.file, d.line, d.col, severity, d.code, d.message
        ));
    }

    let error_word = if error_count == 1 { "error" } else { "errors" };
    let warning_word = if warning_count == 1 {
        "warning"
    } else {
        "warnings"
    };
    let file_word = if file_count == 1 { "file" } else { "files" };
    lines.push(format!(
        "{error_count} {error_word}, {warning_count} {warning_word} in {file_count} {file_word}."
    ));

    Ok((lines.join("\n"), error_count))
}
