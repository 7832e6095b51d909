//! Prompt Model
//!
//! Prompt configurations, fragments, the assembled output and the manifest
//! format they are stored in. Configs are immutable once defaults are
//! populated and they enter the cache.

pub mod assembled;
pub mod config;
pub mod defaults;
pub mod manifest;
pub mod validation;

pub use assembled::{compute_content_hash, AssembledPrompt, PromptInfo};
pub use self::config::{
    Fragment, FragmentRef, MediaConfig, ModelOverride, PromptConfig, TemplateEngineInfo,
    ValidatorConfig, VariableMetadata,
};
pub use defaults::populate_defaults;
pub use manifest::{parse_prompt_manifest, to_prompt_manifest, PromptManifest};
pub use validation::{validate_prompt_config, ValidationResult};
