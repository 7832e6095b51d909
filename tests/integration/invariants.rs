//! Property tests for variable validation and merging.

use promptloom::template::{find_placeholders, substitute_once};
use promptloom::{AssemblyError, InMemoryPromptRepository, PromptConfig, Registry, Vars};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

fn var_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

/// Values never contain braces, so they cannot introduce placeholders.
fn var_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .,!?-]{1,12}"
}

fn registry_with(config: PromptConfig) -> Registry {
    Registry::new(Arc::new(InMemoryPromptRepository::new().with_prompt(config)))
}

proptest! {
    #[test]
    fn missing_required_vars_always_fail(
        names in prop::collection::btree_set(var_name(), 1..6),
        keep_mask in prop::collection::vec(any::<bool>(), 6),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let template = names.iter().map(|n| format!("{{{{{}}}}}", n)).collect::<Vec<_>>().join(" ");
        let mut config = PromptConfig::new("p", template);
        for name in &names {
            config = config.with_required_var(name.clone());
        }

        let vars: Vars = names
            .iter()
            .zip(keep_mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(n, _)| (n.clone(), "v".to_string()))
            .collect();
        let expected_missing: Vec<String> = names
            .iter()
            .filter(|n| !vars.contains_key(*n))
            .cloned()
            .collect();

        let result = registry_with(config).assemble("p", &vars, "");
        if expected_missing.is_empty() {
            prop_assert!(result.is_ok());
        } else {
            match result {
                Err(AssemblyError::MissingRequiredVariables { missing, .. }) => {
                    prop_assert_eq!(missing, expected_missing);
                }
                other => prop_assert!(false, "unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn unspecified_optional_vars_render_default(
        name in var_name(),
        default in var_value(),
        supplied in prop::option::of(var_value()),
    ) {
        let config = PromptConfig::new("p", format!("[{{{{{}}}}}]", name))
            .with_optional_var(name.clone(), default.clone());
        let mut vars = Vars::new();
        if let Some(value) = &supplied {
            vars.insert(name.clone(), value.clone());
        }

        let prompt = registry_with(config).assemble("p", &vars, "").unwrap();
        let expected = supplied.unwrap_or(default);
        prop_assert_eq!(prompt.system_prompt, format!("[{}]", expected));
    }

    #[test]
    fn assembly_is_idempotent(
        vars in prop::collection::hash_map(var_name(), var_value(), 0..5),
    ) {
        let names: BTreeSet<&String> = vars.keys().collect();
        let template = names
            .iter()
            .map(|n| format!("{}={{{{{}}}}}", n, n))
            .collect::<Vec<_>>()
            .join(";");
        let registry = registry_with(PromptConfig::new("p", template));

        let first = registry.assemble("p", &vars, "").unwrap();
        let second = registry.assemble("p", &vars, "").unwrap();
        prop_assert_eq!(&first.system_prompt, &second.system_prompt);
        prop_assert_eq!(first.content_hash, second.content_hash);
    }

    #[test]
    fn substitute_once_leaves_no_known_placeholders(
        vars in prop::collection::hash_map(var_name(), var_value(), 1..5),
        unknown in var_name(),
    ) {
        prop_assume!(!vars.contains_key(&unknown));
        let mut text: String = vars.keys().map(|k| format!("<{{{{{}}}}}>", k)).collect();
        text.push_str(&format!("{{{{{}}}}}", unknown));

        let out = substitute_once(&text, &vars);
        prop_assert_eq!(find_placeholders(&out), vec![unknown]);
    }
}
