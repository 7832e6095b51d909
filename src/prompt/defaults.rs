//! Default population applied to every config before it is cached.

use super::config::{PromptConfig, TemplateEngineInfo, VariableMetadata};

/// Fill in defaults for optional fields.
///
/// - template engine info defaults to the v1 flat-substitution engine
/// - `variables` is synthesized from `required_vars`/`optional_vars` when empty
/// - validator `enabled`/`fail_on_violation` default to true
///
/// Idempotent: running it twice leaves the config unchanged.
pub fn populate_defaults(config: &mut PromptConfig) {
    if config.template_engine.is_none() {
        config.template_engine = Some(TemplateEngineInfo {
            version: "v1".to_string(),
            syntax: "{{variable}}".to_string(),
            features: vec!["basic_substitution".to_string()],
        });
    }

    if config.variables.is_empty()
        && (!config.required_vars.is_empty() || !config.optional_vars.is_empty())
    {
        let required = config.required_vars.iter().map(|name| VariableMetadata {
            name: name.clone(),
            var_type: "string".to_string(),
            required: true,
            ..VariableMetadata::default()
        });
        let optional = config
            .optional_vars
            .iter()
            .map(|(name, default)| VariableMetadata {
                name: name.clone(),
                var_type: "string".to_string(),
                required: false,
                default: Some(default.clone()),
                ..VariableMetadata::default()
            });
        config.variables = required.chain(optional).collect();
    }

    for validator in &mut config.validators {
        validator.enabled.get_or_insert(true);
        validator.fail_on_violation.get_or_insert(true);
    }
}
