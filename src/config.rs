//! Engine Configuration
//!
//! Settings for the prompt repository, the renderer and logging, composed
//! from defaults, config files and `PROMPTLOOM__*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::error::AssemblyError;
use crate::logging::LoggingConfig;
use crate::repository::YamlPromptRepository;
use crate::template::{TemplateRenderer, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), AssemblyError> {
        if self.render.max_depth == 0 {
            return Err(AssemblyError::ConfigError(
                "render.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where prompt manifests and fragments live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySettings {
    /// Defaults to `$XDG_CONFIG_HOME/promptloom/prompts`.
    #[serde(default)]
    pub prompts_dir: Option<PathBuf>,

    /// Defaults to `<prompts_dir>/fragments`.
    #[serde(default)]
    pub fragments_dir: Option<PathBuf>,

    /// Task type -> manifest file, relative to the prompts dir.
    #[serde(default)]
    pub mappings: HashMap<String, String>,
}

impl RepositorySettings {
    pub fn resolved_prompts_dir(&self) -> Result<PathBuf, AssemblyError> {
        match &self.prompts_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::xdg_root::prompts_dir(),
        }
    }

    pub fn build_repository(&self) -> Result<YamlPromptRepository, AssemblyError> {
        let mut repository = YamlPromptRepository::new(self.resolved_prompts_dir()?)
            .with_mappings(self.mappings.clone());
        if let Some(dir) = &self.fragments_dir {
            repository = repository.with_fragments_dir(dir.clone());
        }
        Ok(repository)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Fail on placeholders with no binding instead of leaving them literal.
    #[serde(default)]
    pub strict: bool,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            strict: false,
        }
    }
}

impl RenderSettings {
    pub fn renderer(&self) -> TemplateRenderer {
        TemplateRenderer::new()
            .with_max_depth(self.max_depth)
            .with_strict(self.strict)
    }
}
