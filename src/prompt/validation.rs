use super::config::PromptConfig;
use crate::template::find_placeholders;
use serde::Serialize;
use std::collections::HashSet;

/// Structural report for a prompt configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub task_type: String,
    pub checks: Vec<(String, bool)>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new(task_type: String) -> Self {
        Self {
            task_type,
            checks: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_check(&mut self, description: &str, passed: bool) {
        self.checks.push((description.to_string(), passed));
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Warnings do not affect validity.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.checks.iter().all(|(_, passed)| *passed)
    }

    pub fn total_checks(&self) -> usize {
        self.checks.len()
    }

    pub fn passed_checks(&self) -> usize {
        self.checks.iter().filter(|(_, passed)| *passed).count()
    }
}

/// Run structural checks over a config.
pub fn validate_prompt_config(config: &PromptConfig) -> ValidationResult {
    let mut result = ValidationResult::new(config.task_type.clone());

    result.add_check("Task type is set", !config.task_type.is_empty());
    if config.task_type.is_empty() {
        result.add_error("task_type is empty".to_string());
    }

    let has_template = !config.system_template.trim().is_empty();
    result.add_check("System template is not empty", has_template);
    if !has_template {
        result.add_error("system_template is empty".to_string());
    }

    let unnamed: Vec<usize> = config
        .fragments
        .iter()
        .enumerate()
        .filter(|(_, f)| f.name.trim().is_empty())
        .map(|(i, _)| i)
        .collect();
    result.add_check("All fragment references are named", unnamed.is_empty());
    for index in unnamed {
        result.add_error(format!("Fragment reference #{} has no name", index));
    }

    let empty_overrides: Vec<&String> = config
        .model_overrides
        .iter()
        .filter(|(_, o)| o.is_empty())
        .map(|(model, _)| model)
        .collect();
    result.add_check("Model overrides are non-empty", empty_overrides.is_empty());
    for model in empty_overrides {
        result.add_error(format!(
            "Model override '{}' sets neither system_template nor system_template_suffix",
            model
        ));
    }

    for name in &config.required_vars {
        if config.optional_vars.contains_key(name) {
            result.add_warning(format!(
                "Variable '{}' is declared both required and optional",
                name
            ));
        }
    }

    let mut known: HashSet<&str> = config.required_vars.iter().map(String::as_str).collect();
    known.extend(config.optional_vars.keys().map(String::as_str));
    known.extend(config.variables.iter().map(|v| v.name.as_str()));
    known.extend(config.fragments.iter().map(|f| f.name.as_str()));

    for placeholder in find_placeholders(&config.system_template) {
        if !known.contains(placeholder.as_str()) {
            result.add_warning(format!(
                "Placeholder '{{{{{}}}}}' is not a declared variable or fragment",
                placeholder
            ));
        }
    }

    result
}
