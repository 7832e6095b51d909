//! promptloom: Prompt Assembly Engine
//!
//! Turns versioned prompt configurations into ready-to-send system prompts.
//! A [`Registry`] loads configs through a [`PromptRepository`], validates the
//! caller's variables, fills in optional defaults, resolves fragments, applies
//! per-model overrides and renders the `{{name}}` template.
//!
//! ```
//! use promptloom::{InMemoryPromptRepository, PromptConfig, Registry};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let config = PromptConfig::new("greet", "Hello {{name}}, welcome to {{place}}!")
//!     .with_required_var("name")
//!     .with_optional_var("place", "Earth");
//! let registry = Registry::new(Arc::new(InMemoryPromptRepository::new().with_prompt(config)));
//!
//! let vars = HashMap::from([("name".to_string(), "Alice".to_string())]);
//! let prompt = registry.assemble("greet", &vars, "").unwrap();
//! assert_eq!(prompt.system_prompt, "Hello Alice, welcome to Earth!");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fragment;
pub mod logging;
pub mod prompt;
pub mod registry;
pub mod repository;
pub mod template;
pub mod tooling;
pub mod types;

pub use cache::AssemblyCache;
pub use error::{AssemblyError, RenderError, RepositoryError};
pub use fragment::FragmentResolver;
pub use prompt::{
    AssembledPrompt, Fragment, FragmentRef, ModelOverride, PromptConfig, PromptInfo,
    ValidationResult,
};
pub use registry::{apply_model_overrides, vars_from, Registry};
pub use repository::{InMemoryPromptRepository, PromptRepository, YamlPromptRepository};
pub use template::TemplateRenderer;
pub use types::Vars;
