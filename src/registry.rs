//! Prompt registry.
//!
//! Loads configs through the repository (once per task type), validates and
//! merges variables, resolves fragments, applies model overrides and renders
//! the final prompt.

use crate::cache::AssemblyCache;
use crate::error::{AssemblyError, RenderError, RepositoryError};
use crate::fragment::FragmentResolver;
use crate::prompt::{
    populate_defaults, validate_prompt_config, AssembledPrompt, Fragment, PromptConfig, PromptInfo,
    ValidationResult,
};
use crate::repository::PromptRepository;
use crate::template::{merge_vars, TemplateRenderer};
use crate::types::Vars;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Entry point for prompt assembly. Share it behind an `Arc`.
pub struct Registry {
    repository: Option<Arc<dyn PromptRepository>>,
    cache: Arc<AssemblyCache>,
    fragments: FragmentResolver,
    renderer: TemplateRenderer,
    fragment_base_dir: Option<PathBuf>,
}

impl Registry {
    pub fn new(repository: Arc<dyn PromptRepository>) -> Self {
        Self::build(Some(repository), Arc::new(AssemblyCache::new()))
    }

    /// A registry with no backing store. Only registered configs can be loaded.
    pub fn detached() -> Self {
        Self::build(None, Arc::new(AssemblyCache::new()))
    }

    fn build(repository: Option<Arc<dyn PromptRepository>>, cache: Arc<AssemblyCache>) -> Self {
        let fragment_source: Arc<dyn PromptRepository> = match &repository {
            Some(repo) => repo.clone(),
            None => Arc::new(DetachedRepository),
        };
        Self {
            fragments: FragmentResolver::new(fragment_source, cache.clone()),
            repository,
            cache,
            renderer: TemplateRenderer::new(),
            fragment_base_dir: None,
        }
    }

    pub fn with_renderer(mut self, renderer: TemplateRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Use an existing cache, e.g. one shared with another registry.
    pub fn with_cache(self, cache: Arc<AssemblyCache>) -> Self {
        let renderer = self.renderer;
        let base_dir = self.fragment_base_dir;
        let mut registry = Self::build(self.repository, cache);
        registry.renderer = renderer;
        registry.fragment_base_dir = base_dir;
        registry
    }

    /// Directory that path-based fragment references are resolved against.
    pub fn with_fragment_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fragment_base_dir = Some(dir.into());
        self
    }

    pub fn cache(&self) -> &Arc<AssemblyCache> {
        &self.cache
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Assemble a prompt with no variables and no model override.
    pub fn load(&self, task_type: &str) -> Option<AssembledPrompt> {
        self.load_with_vars(task_type, &Vars::new(), "")
    }

    /// [`assemble`](Self::assemble), with failures logged and collapsed to `None`.
    pub fn load_with_vars(&self, task_type: &str, vars: &Vars, model: &str) -> Option<AssembledPrompt> {
        match self.assemble(task_type, vars, model) {
            Ok(prompt) => Some(prompt),
            Err(e) => {
                tracing::error!(task_type, error = %e, "Prompt assembly failed");
                None
            }
        }
    }

    /// Load, validate, resolve and render a prompt.
    pub fn assemble(
        &self,
        task_type: &str,
        vars: &Vars,
        model: &str,
    ) -> Result<AssembledPrompt, AssemblyError> {
        let config = self.load_config(task_type)?;
        let final_vars = self.prepare_variables(&config, vars, task_type)?;
        let template = apply_model_overrides(&config, model);

        let system_prompt =
            self.renderer
                .render(&template, &final_vars)
                .map_err(|source| AssemblyError::Render {
                    task_type: task_type.to_string(),
                    source,
                })?;

        let assembled = AssembledPrompt::from_config(&config, system_prompt);
        tracing::debug!(
            task_type = %assembled.task_type,
            hash = assembled.short_hash(),
            tools = assembled.allowed_tools.len(),
            validators = assembled.validators.len(),
            "Assembled prompt"
        );
        Ok(assembled)
    }

    /// Cached config for a task type, loading it on a miss.
    pub fn load_config(&self, task_type: &str) -> Result<Arc<PromptConfig>, AssemblyError> {
        let Some(repository) = &self.repository else {
            return self.cache.prompt(task_type).ok_or_else(|| AssemblyError::ConfigLoad {
                task_type: task_type.to_string(),
                source: RepositoryError::Unavailable("no repository configured".to_string()),
            });
        };

        self.cache.get_or_load_prompt(task_type, || {
            let mut config =
                repository
                    .load_prompt(task_type)
                    .map_err(|source| AssemblyError::ConfigLoad {
                        task_type: task_type.to_string(),
                        source,
                    })?;
            populate_defaults(&mut config);
            Ok(config)
        })
    }

    /// Add a config directly, persisting it when a repository is configured.
    pub fn register_config(
        &self,
        task_type: &str,
        mut config: PromptConfig,
    ) -> Result<(), AssemblyError> {
        if task_type.is_empty() {
            return Err(AssemblyError::InvalidArgument(
                "task_type cannot be empty".to_string(),
            ));
        }
        if config.task_type.is_empty() {
            config.task_type = task_type.to_string();
        }
        populate_defaults(&mut config);

        if let Some(repository) = &self.repository {
            repository.save_prompt(&config).map_err(AssemblyError::Persist)?;
        }

        self.cache.insert_prompt(task_type, Arc::new(config));
        tracing::debug!(task_type, "Registered prompt config");
        Ok(())
    }

    /// Every known task type, sorted.
    ///
    /// Falls back to the cache when the repository is absent, fails or has
    /// nothing to list.
    pub fn list_task_types(&self) -> Vec<String> {
        if let Some(repository) = &self.repository {
            match repository.list_prompts() {
                Ok(mut task_types) if !task_types.is_empty() => {
                    task_types.sort();
                    return task_types;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Listing prompts failed, using cache"),
            }
        }
        self.cache.prompt_keys()
    }

    pub fn cached_prompts(&self) -> Vec<String> {
        self.cache.prompt_keys()
    }

    pub fn cached_fragments(&self) -> Vec<String> {
        self.cache.fragment_keys()
    }

    pub fn prompt_info(&self, task_type: &str) -> Result<PromptInfo, AssemblyError> {
        let config = self.load_config(task_type)?;
        Ok(PromptInfo::from(&*config))
    }

    pub fn validate_config(&self, task_type: &str) -> Result<ValidationResult, AssemblyError> {
        let config = self.load_config(task_type)?;
        Ok(validate_prompt_config(&config))
    }

    /// Drop all cached configs and fragments.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Cleared prompt and fragment caches");
    }

    fn prepare_variables(
        &self,
        config: &PromptConfig,
        vars: &Vars,
        task_type: &str,
    ) -> Result<Vars, AssemblyError> {
        self.renderer
            .validate_required_vars(&config.required_vars, vars)
            .map_err(|e| match e {
                RenderError::MissingRequired(missing) => AssemblyError::MissingRequiredVariables {
                    task_type: task_type.to_string(),
                    missing,
                },
                source => AssemblyError::Render {
                    task_type: task_type.to_string(),
                    source,
                },
            })?;

        let defaults: Vars = config
            .optional_vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut final_vars = merge_vars(&[&defaults, vars]);

        if !config.fragments.is_empty() {
            let fragment_vars = self.fragments.assemble_fragments(
                &config.fragments,
                &final_vars,
                self.fragment_base_dir.as_deref(),
            )?;
            final_vars.extend(fragment_vars);
        }

        Ok(final_vars)
    }
}

/// Pick the template for a model: an override template replaces the base,
/// an override suffix is appended. Unknown or empty models get the base.
pub fn apply_model_overrides(config: &PromptConfig, model: &str) -> String {
    let mut template = config.system_template.clone();
    if model.is_empty() {
        return template;
    }

    if let Some(over) = config.model_overrides.get(model) {
        if !over.system_template.is_empty() {
            template = over.system_template.clone();
        }
        template.push_str(&over.system_template_suffix);
    }
    template
}

/// Stand-in fragment source for a registry without a repository.
struct DetachedRepository;

impl DetachedRepository {
    fn unavailable() -> RepositoryError {
        RepositoryError::Unavailable("no repository configured".to_string())
    }
}

impl PromptRepository for DetachedRepository {
    fn load_prompt(&self, _task_type: &str) -> Result<PromptConfig, RepositoryError> {
        Err(Self::unavailable())
    }

    fn load_fragment(
        &self,
        _name: &str,
        _relative_path: Option<&str>,
        _base_dir: Option<&Path>,
    ) -> Result<Fragment, RepositoryError> {
        Err(Self::unavailable())
    }

    fn list_prompts(&self) -> Result<Vec<String>, RepositoryError> {
        Err(Self::unavailable())
    }

    fn save_prompt(&self, _config: &PromptConfig) -> Result<(), RepositoryError> {
        Err(Self::unavailable())
    }
}

/// Build a variable map from `(name, value)` pairs.
pub fn vars_from<I, K, V>(pairs: I) -> Vars
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect::<HashMap<String, String>>()
}
