//! MergeService: orchestrates sources, applies defaults, deserializes to EngineConfig.

use crate::config::sources::{environment, file};
use crate::config::EngineConfig;
use crate::template::DEFAULT_MAX_DEPTH;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<EngineConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = file::add_global_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => file::add_explicit_to_builder(builder, path)?,
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;
        finish(builder)
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<EngineConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = file::add_explicit_to_builder(builder, path)?;
        let builder = environment::add_to_builder(builder)?;
        finish(builder)
    }

    /// Like [`load_from_file`](Self::load_from_file) but with environment
    /// variables taken from `env` rather than the process.
    pub fn load_with_env(
        path: Option<&Path>,
        env: config::Map<String, String>,
    ) -> Result<EngineConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = match path {
            Some(path) => file::add_explicit_to_builder(builder, path)?,
            None => builder,
        };
        let builder = environment::add_map_to_builder(builder, env)?;
        finish(builder)
    }
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("render.max_depth", DEFAULT_MAX_DEPTH as i64)?
        .set_default("render.strict", false)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = builder.build()?.try_deserialize()?;
    config
        .validate()
        .map_err(|e| ConfigError::Message(e.to_string()))?;
    Ok(config)
}
