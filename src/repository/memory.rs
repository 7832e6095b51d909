use crate::error::RepositoryError;
use crate::prompt::{Fragment, PromptConfig};
use crate::repository::PromptRepository;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;

/// In-memory repository. Fragments are looked up by relative path first, then by name.
#[derive(Default)]
pub struct InMemoryPromptRepository {
    prompts: RwLock<HashMap<String, PromptConfig>>,
    fragments: RwLock<HashMap<String, Fragment>>,
}

impl InMemoryPromptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(self, config: PromptConfig) -> Self {
        self.insert_prompt(config);
        self
    }

    pub fn with_fragment(self, key: impl Into<String>, fragment: Fragment) -> Self {
        self.insert_fragment(key, fragment);
        self
    }

    pub fn insert_prompt(&self, config: PromptConfig) {
        self.prompts.write().insert(config.task_type.clone(), config);
    }

    pub fn insert_fragment(&self, key: impl Into<String>, fragment: Fragment) {
        self.fragments.write().insert(key.into(), fragment);
    }

    pub fn remove_fragment(&self, key: &str) -> Option<Fragment> {
        self.fragments.write().remove(key)
    }
}

impl PromptRepository for InMemoryPromptRepository {
    fn load_prompt(&self, task_type: &str) -> Result<PromptConfig, RepositoryError> {
        self.prompts
            .read()
            .get(task_type)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("prompt '{}'", task_type)))
    }

    fn load_fragment(
        &self,
        name: &str,
        relative_path: Option<&str>,
        _base_dir: Option<&Path>,
    ) -> Result<Fragment, RepositoryError> {
        let fragments = self.fragments.read();
        relative_path
            .filter(|p| !p.is_empty())
            .and_then(|p| fragments.get(p))
            .or_else(|| fragments.get(name))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("fragment '{}'", name)))
    }

    fn list_prompts(&self) -> Result<Vec<String>, RepositoryError> {
        let mut task_types: Vec<String> = self.prompts.read().keys().cloned().collect();
        task_types.sort();
        Ok(task_types)
    }

    fn save_prompt(&self, config: &PromptConfig) -> Result<(), RepositoryError> {
        if config.task_type.is_empty() {
            return Err(RepositoryError::Invalid(
                "task_type cannot be empty".to_string(),
            ));
        }
        self.insert_prompt(config.clone());
        Ok(())
    }
}
