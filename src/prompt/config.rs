use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Versioned specification of one prompt.
///
/// Field names follow the `spec:` block of a prompt manifest. Everything past
/// `model_overrides` is downstream metadata the engine passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Unique key for the prompt.
    #[serde(default)]
    pub task_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Base template with `{{name}}` placeholders.
    #[serde(default)]
    pub system_template: String,

    /// Variables the caller must supply, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_vars: Vec<String>,

    /// Optional variables and their defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub optional_vars: BTreeMap<String, String>,

    /// Enhanced variable metadata; synthesized from the var lists when absent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<VariableMetadata>,

    /// Fragment references, assembled in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fragments: Vec<FragmentRef>,

    /// Model id -> template override.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub model_overrides: BTreeMap<String, ModelOverride>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_engine: Option<TemplateEngineInfo>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_tools: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaConfig>,
}

impl PromptConfig {
    /// Create a config with a task type and base template.
    pub fn new(task_type: impl Into<String>, system_template: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            system_template: system_template.into(),
            ..Self::default()
        }
    }

    pub fn with_required_var(mut self, name: impl Into<String>) -> Self {
        self.required_vars.push(name.into());
        self
    }

    pub fn with_optional_var(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.optional_vars.insert(name.into(), default.into());
        self
    }

    pub fn with_fragment(mut self, fragment: FragmentRef) -> Self {
        self.fragments.push(fragment);
        self
    }

    pub fn with_model_override(mut self, model: impl Into<String>, value: ModelOverride) -> Self {
        self.model_overrides.insert(model.into(), value);
        self
    }

    pub fn with_allowed_tool(mut self, tool: impl Into<String>) -> Self {
        self.allowed_tools.push(tool.into());
        self
    }

    pub fn with_validator(mut self, validator: ValidatorConfig) -> Self {
        self.validators.push(validator);
        self
    }
}

/// Reference to a fragment. `name` and `path` may embed `{{var}}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRef {
    pub name: String,

    /// Relative path to the fragment file, resolved against the base dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub required: bool,
}

impl FragmentRef {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            required: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Reusable block of template text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default, rename = "fragment_type", skip_serializing_if = "String::is_empty")]
    pub fragment_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Raw template text, injected verbatim.
    #[serde(default)]
    pub content: String,

    /// File the fragment was read from, when it came from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl Fragment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// Per-model template replacement and/or suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOverride {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system_template: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system_template_suffix: String,
}

impl ModelOverride {
    pub fn is_empty(&self) -> bool {
        self.system_template.is_empty() && self.system_template_suffix.is_empty()
    }
}

/// Guardrail configuration, carried through to the assembled prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(rename = "type")]
    pub validator_type: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,

    /// Defaults to true once the config is cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Defaults to true once the config is cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_violation: Option<bool>,
}

impl ValidatorConfig {
    pub fn new(validator_type: impl Into<String>) -> Self {
        Self {
            validator_type: validator_type.into(),
            ..Self::default()
        }
    }
}

/// Metadata describing one template variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableMetadata {
    pub name: String,

    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub var_type: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,

    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEngineInfo {
    pub version: String,
    pub syntax: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

/// Multimodal media settings. Only `enabled` and `supported_types` are typed;
/// anything else is kept as-is for downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_types: Vec<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
