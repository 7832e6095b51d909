use promptloom::config::paths::xdg_root;
use promptloom::repository::PromptRepository;
use promptloom::{vars_from, AssemblyError, PromptConfig, Registry, YamlPromptRepository};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const SUPPORT: &str = r#"apiVersion: promptloom.dev/v1
kind: PromptConfig
metadata:
  name: customer-support
  labels:
    team: cx
spec:
  task_type: customer-support
  version: v2.1.0
  description: Support agent
  system_template: |-
    {{persona_{{region}}}}
    {{tone}}
    Help {{customer}} with their request.
  required_vars: [customer]
  optional_vars:
    region: us
  fragments:
    - name: tone
      path: shared/tone.md
      required: true
    - name: "persona_{{region}}"
      required: true
  model_overrides:
    gpt-4:
      system_template_suffix: "\nUse markdown."
  allowed_tools: [lookup_order]
  validators:
    - type: banned_words
      params:
        words: [guarantee]
"#;

fn write_fixture(root: &Path) {
    fs::create_dir_all(root.join("fragments")).unwrap();
    fs::create_dir_all(root.join("shared")).unwrap();
    fs::write(root.join("support.yaml"), SUPPORT).unwrap();
    fs::write(
        root.join("fragments/persona_us.yaml"),
        "fragment_type: persona\ncontent: \"You are a cheerful US support agent.\"\n",
    )
    .unwrap();
    fs::write(
        root.join("fragments/persona_uk.yaml"),
        "fragment_type: persona\ncontent: \"You are a courteous UK support agent.\"\n",
    )
    .unwrap();
    fs::write(root.join("shared/tone.md"), "Keep a calm tone.").unwrap();
}

fn registry_for(root: &Path) -> Registry {
    Registry::new(Arc::new(YamlPromptRepository::new(root))).with_fragment_base_dir(root)
}

#[test]
fn substituted_text_is_not_rescanned() {
    // Only the inner `{{region}}` is a placeholder; the braces around it stay literal.
    let temp = TempDir::new().unwrap();
    write_fixture(temp.path());
    let registry = registry_for(temp.path());

    let prompt = registry
        .assemble("customer-support", &vars_from([("customer", "Ana")]), "")
        .unwrap();
    assert!(prompt.system_prompt.starts_with("{{persona_us}}\nKeep a calm tone."));
}

#[test]
fn yaml_repository_end_to_end() {
    let temp = TempDir::new().unwrap();
    write_fixture(temp.path());
    let manifest = SUPPORT.replace("{{persona_{{region}}}}", "{{persona_us}}{{persona_uk}}");
    fs::write(temp.path().join("support.yaml"), manifest).unwrap();
    let registry = registry_for(temp.path());

    let us = registry
        .assemble("customer-support", &vars_from([("customer", "Ana")]), "gpt-4")
        .unwrap();
    assert_eq!(
        us.system_prompt,
        "You are a cheerful US support agent.{{persona_uk}}\nKeep a calm tone.\nHelp Ana with their request.\nUse markdown."
    );
    assert_eq!(us.allowed_tools, vec!["lookup_order"]);
    assert_eq!(us.validators[0].validator_type, "banned_words");
    assert_eq!(us.validators[0].enabled, Some(true));

    let uk = registry
        .assemble(
            "customer-support",
            &vars_from([("customer", "Ana"), ("region", "uk")]),
            "",
        )
        .unwrap();
    assert_eq!(
        uk.system_prompt,
        "{{persona_us}}You are a courteous UK support agent.\nKeep a calm tone.\nHelp Ana with their request."
    );

    assert_eq!(
        registry.cached_fragments(),
        vec!["persona_uk", "persona_us", "shared/tone.md"]
    );

    let info = registry.prompt_info("customer-support").unwrap();
    assert_eq!(info.version, "v2.1.0");
    assert_eq!(info.fragment_count, 2);
}

#[test]
fn missing_required_fragment_aborts() {
    let temp = TempDir::new().unwrap();
    write_fixture(temp.path());
    fs::remove_file(temp.path().join("fragments/persona_uk.yaml")).unwrap();
    let registry = registry_for(temp.path());

    match registry.assemble(
        "customer-support",
        &vars_from([("customer", "Ana"), ("region", "uk")]),
        "",
    ) {
        Err(AssemblyError::RequiredFragmentMissing {
            resolved_name,
            original_name,
            source,
        }) => {
            assert_eq!(resolved_name, "persona_uk");
            assert_eq!(original_name, "persona_{{region}}");
            assert!(source.is_not_found());
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn mappings_and_listing() {
    let temp = TempDir::new().unwrap();
    write_fixture(temp.path());

    let scanned = YamlPromptRepository::new(temp.path());
    assert_eq!(scanned.list_prompts().unwrap(), vec!["customer-support"]);

    let mapped = YamlPromptRepository::new(temp.path()).with_mappings(HashMap::from([(
        "support-v2".to_string(),
        "support.yaml".to_string(),
    )]));
    assert_eq!(mapped.list_prompts().unwrap(), vec!["support-v2"]);
    assert_eq!(
        mapped.load_prompt("support-v2").unwrap().task_type,
        "customer-support"
    );
}

#[test]
fn register_persists_manifest() {
    let temp = TempDir::new().unwrap();
    let registry = registry_for(temp.path());

    let config = PromptConfig::new("haiku", "Write a haiku about {{topic}}.").with_required_var("topic");
    registry.register_config("haiku", config).unwrap();
    assert!(temp.path().join("haiku.yaml").exists());

    // A fresh registry over the same directory sees the saved manifest.
    let fresh = registry_for(temp.path());
    assert_eq!(fresh.list_task_types(), vec!["haiku"]);
    let loaded = fresh.load_config("haiku").unwrap();
    assert_eq!(loaded.required_vars, vec!["topic"]);
    assert_eq!(loaded.variables.len(), 1);
    assert_eq!(
        fresh
            .assemble("haiku", &vars_from([("topic", "rain")]), "")
            .unwrap()
            .system_prompt,
        "Write a haiku about rain."
    );
}

#[test]
fn invalid_manifest_reports_invalid() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("broken.yaml"),
        "apiVersion: promptloom.dev/v1\nkind: Deployment\nmetadata:\n  name: broken\nspec:\n  task_type: broken\n",
    )
    .unwrap();
    let registry = registry_for(temp.path());

    match registry.load_config("broken") {
        Err(AssemblyError::ConfigLoad { source, .. }) => {
            assert!(!source.is_not_found());
            assert!(source.to_string().contains("Invalid kind"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(registry.list_task_types().is_empty());
}

#[test]
fn default_prompts_dir_is_under_config_home() {
    if let Ok(dir) = xdg_root::prompts_dir() {
        assert!(dir.ends_with("promptloom/prompts"));
    }
}
