use promptloom::{
    vars_from, AssemblyError, Fragment, FragmentRef, InMemoryPromptRepository, ModelOverride,
    PromptConfig, Registry, Vars,
};
use std::sync::Arc;

fn greet_registry() -> Registry {
    let config = PromptConfig::new("greet", "Hello {{name}}, welcome to {{place}}!")
        .with_required_var("name")
        .with_optional_var("place", "Earth");
    Registry::new(Arc::new(InMemoryPromptRepository::new().with_prompt(config)))
}

#[test]
fn greet_with_all_vars() {
    let registry = greet_registry();
    let prompt = registry
        .load_with_vars(
            "greet",
            &vars_from([("name", "Alice"), ("place", "Wonderland")]),
            "",
        )
        .unwrap();
    assert_eq!(prompt.system_prompt, "Hello Alice, welcome to Wonderland!");
}

#[test]
fn greet_uses_optional_default() {
    let registry = greet_registry();
    let prompt = registry
        .load_with_vars("greet", &vars_from([("name", "Alice")]), "")
        .unwrap();
    assert_eq!(prompt.system_prompt, "Hello Alice, welcome to Earth!");
}

#[test]
fn greet_without_required_var_fails() {
    let registry = greet_registry();
    assert!(registry.load("greet").is_none());
    assert!(matches!(
        registry.assemble("greet", &Vars::new(), ""),
        Err(AssemblyError::MissingRequiredVariables { .. })
    ));
}

#[test]
fn support_prompt_with_fragments_and_override() {
    let config = PromptConfig::new("support", "{{persona}}\n{{guidelines}}\nCustomer: {{customer}}")
        .with_required_var("customer")
        .with_optional_var("persona", "{{persona_base}}")
        .with_fragment(FragmentRef::required("persona_base").with_path("personas/{{region}}.yaml"))
        .with_fragment(FragmentRef::optional("guidelines"))
        .with_fragment(FragmentRef::optional("legal_{{region}}"))
        .with_model_override(
            "gpt-4",
            ModelOverride {
                system_template: String::new(),
                system_template_suffix: "\nAnswer concisely.".to_string(),
            },
        );

    let repo = InMemoryPromptRepository::new()
        .with_prompt(config)
        .with_fragment("personas/us.yaml", Fragment::new("You are a friendly US agent."))
        .with_fragment("personas/uk.yaml", Fragment::new("You are a polite UK agent."))
        .with_fragment("guidelines", Fragment::new("Never share {{secret_name}}."));
    let registry = Registry::new(Arc::new(repo));

    let vars = vars_from([("customer", "Dana"), ("region", "us"), ("secret_name", "passwords")]);
    let prompt = registry.assemble("support", &vars, "gpt-4").unwrap();
    assert_eq!(
        prompt.system_prompt,
        "You are a friendly US agent.\nNever share passwords.\nCustomer: Dana\nAnswer concisely."
    );

    let uk = registry
        .assemble(
            "support",
            &vars_from([("customer", "Dana"), ("region", "uk"), ("secret_name", "passwords")]),
            "",
        )
        .unwrap();
    assert_eq!(
        uk.system_prompt,
        "You are a polite UK agent.\nNever share passwords.\nCustomer: Dana"
    );

    assert_eq!(
        registry.cached_fragments(),
        vec!["guidelines", "personas/uk.yaml", "personas/us.yaml"]
    );
}

#[test]
fn registered_config_is_served_without_repository() {
    let registry = Registry::detached();
    registry
        .register_config(
            "summarize",
            PromptConfig {
                system_template: "Summarize in {{words}} words.".to_string(),
                ..PromptConfig::default()
            }
            .with_optional_var("words", "50"),
        )
        .unwrap();

    assert_eq!(registry.list_task_types(), vec!["summarize"]);
    assert_eq!(
        registry.load("summarize").unwrap().system_prompt,
        "Summarize in 50 words."
    );
}
