use promptloom::error::RepositoryError;
use promptloom::repository::PromptRepository;
use promptloom::{
    vars_from, Fragment, FragmentRef, InMemoryPromptRepository, PromptConfig, Registry,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Slow repository that counts every call.
struct SlowRepo {
    inner: InMemoryPromptRepository,
    prompt_calls: AtomicUsize,
    fragment_calls: AtomicUsize,
}

impl SlowRepo {
    fn new() -> Self {
        let config = PromptConfig::new("support", "{{persona}} Help {{customer}}.")
            .with_required_var("customer")
            .with_fragment(FragmentRef::required("persona"));
        Self {
            inner: InMemoryPromptRepository::new()
                .with_prompt(config)
                .with_prompt(PromptConfig::new("other", "Other prompt"))
                .with_fragment("persona", Fragment::new("You are kind.")),
            prompt_calls: AtomicUsize::new(0),
            fragment_calls: AtomicUsize::new(0),
        }
    }
}

impl PromptRepository for SlowRepo {
    fn load_prompt(&self, task_type: &str) -> Result<PromptConfig, RepositoryError> {
        self.prompt_calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        self.inner.load_prompt(task_type)
    }

    fn load_fragment(
        &self,
        name: &str,
        relative_path: Option<&str>,
        base_dir: Option<&Path>,
    ) -> Result<Fragment, RepositoryError> {
        self.fragment_calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        self.inner.load_fragment(name, relative_path, base_dir)
    }

    fn list_prompts(&self) -> Result<Vec<String>, RepositoryError> {
        self.inner.list_prompts()
    }

    fn save_prompt(&self, config: &PromptConfig) -> Result<(), RepositoryError> {
        self.inner.save_prompt(config)
    }
}

#[test]
fn concurrent_misses_load_once() {
    let repo = Arc::new(SlowRepo::new());
    let registry = Arc::new(Registry::new(repo.clone()));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                registry
                    .assemble("support", &vars_from([("customer", format!("c{i}"))]), "")
                    .unwrap()
                    .system_prompt
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("You are kind. Help c{i}."));
    }
    assert_eq!(repo.prompt_calls.load(Ordering::SeqCst), 1);
    assert_eq!(repo.fragment_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn different_task_types_load_independently() {
    let repo = Arc::new(SlowRepo::new());
    let registry = Arc::new(Registry::new(repo.clone()));

    let handles: Vec<_> = ["support", "other", "support", "other"]
        .into_iter()
        .map(|task| {
            let registry = registry.clone();
            thread::spawn(move || registry.load_config(task).unwrap().task_type.clone())
        })
        .collect();

    let mut loaded: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    loaded.sort();
    assert_eq!(loaded, vec!["other", "other", "support", "support"]);
    assert_eq!(repo.prompt_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn clear_cache_during_reads_is_safe() {
    let repo = Arc::new(SlowRepo::new());
    let registry = Arc::new(Registry::new(repo.clone()));

    let readers: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                for _ in 0..5 {
                    let prompt = registry
                        .assemble("support", &vars_from([("customer", format!("c{i}"))]), "")
                        .unwrap();
                    assert_eq!(prompt.system_prompt, format!("You are kind. Help c{i}."));
                }
            })
        })
        .collect();

    for _ in 0..5 {
        registry.clear_cache();
        thread::sleep(Duration::from_millis(10));
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert!(repo.prompt_calls.load(Ordering::SeqCst) >= 1);
}
