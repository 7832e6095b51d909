//! CLI Tooling
//!
//! Command-line interface for rendering and inspecting prompts stored in a
//! manifest directory.

use crate::config::{ConfigLoader, EngineConfig};
use crate::error::AssemblyError;
use crate::logging::LoggingConfig;
use crate::prompt::{PromptInfo, ValidationResult};
use crate::registry::Registry;
use crate::types::Vars;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// promptloom CLI - assemble LLM system prompts from versioned manifests
#[derive(Parser)]
#[command(name = "promptloom")]
#[command(about = "Assemble LLM system prompts from versioned YAML manifests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Prompt manifest directory (overrides repository.prompts_dir)
    #[arg(long)]
    pub prompts_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold the logging flags into a loaded logging config.
    pub fn apply_logging_overrides(&self, logging: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render a prompt
    Render {
        /// Task type to render
        task_type: String,
        /// Variable binding, repeatable (name=value)
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
        /// Model id used to select an override
        #[arg(long, default_value = "")]
        model: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List available task types
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show a summary of one prompt config
    Info {
        task_type: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Run structural checks on a prompt config
    Validate {
        task_type: String,
        /// Show check summary and warnings
        #[arg(long)]
        verbose: bool,
    },
}

/// Parse `name=value`. The value may be empty and may contain `=`.
pub fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("invalid variable '{}': expected name=value", s)),
    }
}

/// Load engine config for the CLI, applying the `--prompts-dir` override.
pub fn load_engine_config(
    config_path: Option<&Path>,
    prompts_dir: Option<PathBuf>,
) -> Result<EngineConfig, AssemblyError> {
    let mut config = ConfigLoader::load(config_path)?;
    if let Some(dir) = prompts_dir {
        config.repository.prompts_dir = Some(dir);
    }
    Ok(config)
}

/// CLI context holding the registry built from configuration
pub struct CliContext {
    registry: Arc<Registry>,
    config: EngineConfig,
}

impl CliContext {
    /// Create a new CLI context from config files and environment
    pub fn new(config_path: Option<PathBuf>, prompts_dir: Option<PathBuf>) -> Result<Self, AssemblyError> {
        let config = load_engine_config(config_path.as_deref(), prompts_dir)?;
        Self::from_config(config)
    }

    pub fn from_config(config: EngineConfig) -> Result<Self, AssemblyError> {
        config.validate()?;
        let repository = config.repository.build_repository()?;
        let base_dir = repository.root().to_path_buf();
        tracing::debug!(prompts_dir = %base_dir.display(), "Using prompt repository");

        let registry = Registry::new(Arc::new(repository))
            .with_renderer(config.render.renderer())
            .with_fragment_base_dir(base_dir);

        Ok(Self {
            registry: Arc::new(registry),
            config,
        })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, AssemblyError> {
        match command {
            Commands::Render {
                task_type,
                vars,
                model,
                format,
            } => self.handle_render(task_type, vars, model, format),
            Commands::List { format } => self.handle_list(format),
            Commands::Info { task_type, format } => self.handle_info(task_type, format),
            Commands::Validate { task_type, verbose } => {
                let result = self.registry.validate_config(task_type)?;
                Ok(format_validation_result(&result, *verbose))
            }
        }
    }

    fn handle_render(
        &self,
        task_type: &str,
        pairs: &[(String, String)],
        model: &str,
        format: &str,
    ) -> Result<String, AssemblyError> {
        check_format(format)?;
        let vars: Vars = pairs.iter().cloned().collect();
        let prompt = self.registry.assemble(task_type, &vars, model)?;

        if format == "json" {
            Ok(serde_json::to_string_pretty(&prompt).unwrap_or_else(|_| "{}".to_string()))
        } else {
            Ok(prompt.system_prompt)
        }
    }

    fn handle_list(&self, format: &str) -> Result<String, AssemblyError> {
        check_format(format)?;
        let task_types = self.registry.list_task_types();

        if format == "json" {
            return Ok(serde_json::to_string_pretty(&json!({ "task_types": task_types }))
                .unwrap_or_else(|_| "{}".to_string()));
        }
        if task_types.is_empty() {
            return Ok("No prompts found.".to_string());
        }
        Ok(task_types.join("\n"))
    }

    fn handle_info(&self, task_type: &str, format: &str) -> Result<String, AssemblyError> {
        check_format(format)?;
        let info = self.registry.prompt_info(task_type)?;

        if format == "json" {
            Ok(serde_json::to_string_pretty(&info).unwrap_or_else(|_| "{}".to_string()))
        } else {
            Ok(format_prompt_info_text(&info))
        }
    }
}

fn check_format(format: &str) -> Result<(), AssemblyError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(AssemblyError::InvalidArgument(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn format_prompt_info_text(info: &PromptInfo) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);

    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    table.add_row(vec!["Task type".to_string(), info.task_type.clone()]);
    table.add_row(vec!["Version".to_string(), or_dash(&info.version)]);
    table.add_row(vec!["Description".to_string(), or_dash(&info.description)]);
    table.add_row(vec!["Fragments".to_string(), info.fragment_count.to_string()]);
    table.add_row(vec!["Required vars".to_string(), join_or_dash(&info.required_vars)]);
    table.add_row(vec!["Optional vars".to_string(), join_or_dash(&info.optional_vars)]);
    table.add_row(vec!["Allowed tools".to_string(), join_or_dash(&info.tool_allowlist)]);
    table.add_row(vec!["Model overrides".to_string(), join_or_dash(&info.model_overrides)]);
    table.to_string()
}

fn format_validation_result(result: &ValidationResult, verbose: bool) -> String {
    let mut output = format!("Validating prompt: {}\n\n", result.task_type);

    if result.is_valid() {
        output.push_str("All validation checks passed\n");
    } else {
        for (description, passed) in &result.checks {
            let mark = if *passed { "ok" } else { "FAIL" };
            output.push_str(&format!("[{}] {}\n", mark, description));
        }
        if !result.errors.is_empty() {
            output.push('\n');
            for error in &result.errors {
                output.push_str(&format!("error: {}\n", error));
            }
        }
    }

    if verbose {
        for warning in &result.warnings {
            output.push_str(&format!("warning: {}\n", warning));
        }
        output.push_str(&format!(
            "\nValidation summary: {}/{} checks passed\n",
            result.passed_checks(),
            result.total_checks()
        ));
    } else if result.is_valid() {
        output.push_str(&format!(
            "Validation passed: {}/{} checks\n",
            result.passed_checks(),
            result.total_checks()
        ));
    } else {
        output.push_str(&format!(
            "Validation failed: {} error(s) found\n",
            result.errors.len()
        ));
    }

    output
}
