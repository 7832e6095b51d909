use crate::error::RepositoryError;
use crate::prompt::{Fragment, PromptConfig};
use std::path::Path;

/// Storage port consumed by the registry and fragment resolver.
///
/// Implementations must tolerate concurrent reads.
pub trait PromptRepository: Send + Sync {
    fn load_prompt(&self, task_type: &str) -> Result<PromptConfig, RepositoryError>;

    /// Load a fragment by name, or by `relative_path` under `base_dir` when a path is given.
    fn load_fragment(
        &self,
        name: &str,
        relative_path: Option<&str>,
        base_dir: Option<&Path>,
    ) -> Result<Fragment, RepositoryError>;

    fn list_prompts(&self) -> Result<Vec<String>, RepositoryError>;

    fn save_prompt(&self, config: &PromptConfig) -> Result<(), RepositoryError>;
}
