use super::config::{PromptConfig, ValidatorConfig};
use crate::types::ContentHash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A fully rendered prompt ready for LLM execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledPrompt {
    pub task_type: String,
    pub system_prompt: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorConfig>,
    /// Hex SHA-256 of `system_prompt`. Diagnostics only.
    pub content_hash: String,
}

impl AssembledPrompt {
    pub(crate) fn from_config(config: &PromptConfig, system_prompt: String) -> Self {
        let content_hash = hex::encode(compute_content_hash(&system_prompt));
        Self {
            task_type: config.task_type.clone(),
            system_prompt,
            allowed_tools: config.allowed_tools.clone(),
            validators: config.validators.clone(),
            content_hash,
        }
    }

    /// True if this prompt has tools configured
    pub fn uses_tools(&self) -> bool {
        !self.allowed_tools.is_empty()
    }

    /// First 8 hex chars of the content hash, as used in log lines.
    pub fn short_hash(&self) -> &str {
        self.content_hash.get(..8).unwrap_or(&self.content_hash)
    }
}

/// Compute the SHA-256 digest of rendered prompt text
pub fn compute_content_hash(text: &str) -> ContentHash {
    Sha256::digest(text.as_bytes()).into()
}

/// Summary information about a prompt configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptInfo {
    pub task_type: String,
    pub version: String,
    pub description: String,
    pub fragment_count: usize,
    pub required_vars: Vec<String>,
    pub optional_vars: Vec<String>,
    pub tool_allowlist: Vec<String>,
    pub model_overrides: Vec<String>,
}

impl From<&PromptConfig> for PromptInfo {
    fn from(config: &PromptConfig) -> Self {
        Self {
            task_type: config.task_type.clone(),
            version: config.version.clone(),
            description: config.description.clone(),
            fragment_count: config.fragments.len(),
            required_vars: config.required_vars.clone(),
            optional_vars: config.optional_vars.keys().cloned().collect(),
            tool_allowlist: config.allowed_tools.clone(),
            model_overrides: config.model_overrides.keys().cloned().collect(),
        }
    }
}
