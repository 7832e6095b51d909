//! K8s-style prompt manifest (`apiVersion` / `kind` / `metadata` / `spec`).

use super::config::PromptConfig;
use crate::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MANIFEST_KIND: &str = "PromptConfig";
pub const DEFAULT_API_VERSION: &str = "promptloom.dev/v1";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptManifest {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ManifestMetadata,
    #[serde(default)]
    pub spec: PromptConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Parse and validate a prompt manifest, returning its spec.
pub fn parse_prompt_manifest(data: &str) -> Result<PromptConfig, RepositoryError> {
    let manifest: PromptManifest = serde_yaml::from_str(data)
        .map_err(|e| RepositoryError::Invalid(format!("Failed to parse YAML: {}", e)))?;

    if manifest.api_version.is_empty() {
        return Err(RepositoryError::Invalid(
            "Missing required field: apiVersion".to_string(),
        ));
    }
    if manifest.kind != MANIFEST_KIND {
        return Err(RepositoryError::Invalid(format!(
            "Invalid kind: expected '{}', got '{}'",
            MANIFEST_KIND, manifest.kind
        )));
    }
    if manifest.metadata.name.is_empty() {
        return Err(RepositoryError::Invalid(
            "Missing required field: metadata.name".to_string(),
        ));
    }
    if manifest.spec.task_type.is_empty() {
        return Err(RepositoryError::Invalid(
            "Missing required field: spec.task_type".to_string(),
        ));
    }

    Ok(manifest.spec)
}

/// Wrap a config in a manifest and serialize it to YAML.
pub fn to_prompt_manifest(config: &PromptConfig) -> Result<String, RepositoryError> {
    let manifest = PromptManifest {
        api_version: DEFAULT_API_VERSION.to_string(),
        kind: MANIFEST_KIND.to_string(),
        metadata: ManifestMetadata {
            name: config.task_type.clone(),
            labels: BTreeMap::new(),
        },
        spec: config.clone(),
    };
    serde_yaml::to_string(&manifest)
        .map_err(|e| RepositoryError::Invalid(format!("Failed to serialize manifest: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
apiVersion: promptloom.dev/v1
kind: PromptConfig
metadata:
  name: test-support
spec:
  task_type: support
  version: v1.0.0
  system_template: "You are a helpful assistant"
"#;

    #[test]
    fn test_parse_valid_manifest() {
        let config = parse_prompt_manifest(VALID).unwrap();
        assert_eq!(config.task_type, "support");
        assert_eq!(config.system_template, "You are a helpful assistant");
    }

    #[test]
    fn test_rejects_wrong_kind() {
        let yaml = VALID.replace("kind: PromptConfig", "kind: Persona");
        let err = parse_prompt_manifest(&yaml).unwrap_err();
        assert!(err.to_string().contains("Invalid kind"));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let no_api = VALID.replace("apiVersion: promptloom.dev/v1\n", "");
        assert!(parse_prompt_manifest(&no_api)
            .unwrap_err()
            .to_string()
            .contains("apiVersion"));

        let no_task = VALID.replace("  task_type: support\n", "");
        assert!(parse_prompt_manifest(&no_task)
            .unwrap_err()
            .to_string()
            .contains("spec.task_type"));

        let no_name = VALID.replace("  name: test-support\n", "");
        assert!(parse_prompt_manifest(&no_name)
            .unwrap_err()
            .to_string()
            .contains("metadata.name"));
    }

    #[test]
    fn test_rejects_invalid_yaml() {
        let err = parse_prompt_manifest("this is not: [valid yaml").unwrap_err();
        assert!(matches!(err, RepositoryError::Invalid(_)));
    }

    #[test]
    fn test_manifest_round_trip_keeps_spec() {
        let config = PromptConfig::new("save-test", "Test system template").with_required_var("x");
        let yaml = to_prompt_manifest(&config).unwrap();
        assert!(yaml.contains("kind: PromptConfig"));
        let parsed = parse_prompt_manifest(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
