//! Assembly cache
//!
//! Holds loaded prompt configs and fragments behind a single read-write lock,
//! so a reset clears both maps at once. Misses go through a per-key gate so
//! that concurrent callers missing on the same key trigger one load.

use crate::prompt::{Fragment, PromptConfig};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

#[derive(Default)]
struct CacheMaps {
    prompts: HashMap<String, Arc<PromptConfig>>,
    fragments: HashMap<String, Fragment>,
    /// Bumped by every reset; loads started under an older generation are not stored.
    generation: u64,
}

/// Per-key mutex table.
///
/// Gates live only while someone holds or waits on them; [`release`](Self::release)
/// drops an entry once its last user is done.
pub struct KeyedGates<K> {
    gates: RwLock<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedGates<K> {
    pub fn new() -> Self {
        Self {
            gates: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the gate for a key.
    pub fn gate(&self, key: &K) -> Arc<Mutex<()>> {
        {
            let map = self.gates.read();
            if let Some(gate) = map.get(key) {
                return gate.clone();
            }
        }

        let mut map = self.gates.write();
        // Another thread may have inserted it between the two locks.
        map.entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Hand back a gate obtained from [`gate`](Self::gate).
    ///
    /// The entry is removed when the table and the caller hold the only
    /// references. Clones are only taken under the table lock, so the count
    /// cannot grow while it is checked.
    pub fn release(&self, key: &K, gate: Arc<Mutex<()>>) {
        let mut map = self.gates.write();
        let idle = map
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, &gate) && Arc::strong_count(&gate) == 2);
        if idle {
            map.remove(key);
        }
    }

    /// Forget every gate. Holders of a dropped gate keep their lock.
    pub fn clear(&self) {
        self.gates.write().clear();
    }

    pub fn len(&self) -> usize {
        self.gates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.read().is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedGates<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared cache for the registry and fragment resolver.
#[derive(Default)]
pub struct AssemblyCache {
    maps: RwLock<CacheMaps>,
    prompt_gates: KeyedGates<String>,
    fragment_gates: KeyedGates<String>,
}

impl AssemblyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self, task_type: &str) -> Option<Arc<PromptConfig>> {
        self.maps.read().prompts.get(task_type).cloned()
    }

    pub fn fragment(&self, key: &str) -> Option<Fragment> {
        self.maps.read().fragments.get(key).cloned()
    }

    /// Insert or overwrite a prompt entry.
    pub fn insert_prompt(&self, task_type: impl Into<String>, config: Arc<PromptConfig>) {
        self.maps.write().prompts.insert(task_type.into(), config);
    }

    pub fn insert_fragment(&self, key: impl Into<String>, fragment: Fragment) {
        self.maps.write().fragments.insert(key.into(), fragment);
    }

    fn generation(&self) -> u64 {
        self.maps.read().generation
    }

    /// Return the cached prompt, or run `load` exactly once across concurrent
    /// callers and cache its result. Errors are not cached, and neither is a
    /// result whose load overlapped a [`clear`](Self::clear).
    pub fn get_or_load_prompt<E, F>(&self, task_type: &str, load: F) -> Result<Arc<PromptConfig>, E>
    where
        F: FnOnce() -> Result<PromptConfig, E>,
    {
        if let Some(config) = self.prompt(task_type) {
            tracing::debug!(task_type, "Prompt cache hit");
            return Ok(config);
        }

        let key = task_type.to_string();
        let gate = self.prompt_gates.gate(&key);
        let result = {
            let _guard = gate.lock();
            self.load_prompt_gated(task_type, load)
        };
        self.prompt_gates.release(&key, gate);
        result
    }

    fn load_prompt_gated<E, F>(&self, task_type: &str, load: F) -> Result<Arc<PromptConfig>, E>
    where
        F: FnOnce() -> Result<PromptConfig, E>,
    {
        if let Some(config) = self.prompt(task_type) {
            tracing::debug!(task_type, "Prompt loaded by concurrent caller");
            return Ok(config);
        }

        tracing::debug!(task_type, "Prompt cache miss");
        let generation = self.generation();
        let config = Arc::new(load()?);

        let mut maps = self.maps.write();
        if maps.generation == generation {
            maps.prompts.insert(task_type.to_string(), config.clone());
        } else {
            tracing::debug!(task_type, "Cache cleared during load, result not stored");
        }
        Ok(config)
    }

    /// Fragment counterpart of [`get_or_load_prompt`](Self::get_or_load_prompt).
    pub fn get_or_load_fragment<E, F>(&self, key: &str, load: F) -> Result<Fragment, E>
    where
        F: FnOnce() -> Result<Fragment, E>,
    {
        if let Some(fragment) = self.fragment(key) {
            tracing::debug!(key, "Fragment cache hit");
            return Ok(fragment);
        }

        let owned = key.to_string();
        let gate = self.fragment_gates.gate(&owned);
        let result = {
            let _guard = gate.lock();
            self.load_fragment_gated(key, load)
        };
        self.fragment_gates.release(&owned, gate);
        result
    }

    fn load_fragment_gated<E, F>(&self, key: &str, load: F) -> Result<Fragment, E>
    where
        F: FnOnce() -> Result<Fragment, E>,
    {
        if let Some(fragment) = self.fragment(key) {
            return Ok(fragment);
        }

        tracing::debug!(key, "Fragment cache miss");
        let generation = self.generation();
        let fragment = load()?;

        let mut maps = self.maps.write();
        if maps.generation == generation {
            maps.fragments.insert(key.to_string(), fragment.clone());
        }
        Ok(fragment)
    }

    /// Sorted task types currently cached.
    pub fn prompt_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.maps.read().prompts.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Sorted fragment keys currently cached.
    pub fn fragment_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.maps.read().fragments.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Drop every cached prompt and fragment in one step.
    ///
    /// Loads already in flight still return their result to their caller but
    /// do not store it, so the next lookup fetches again.
    pub fn clear(&self) {
        {
            let mut maps = self.maps.write();
            maps.prompts.clear();
            maps.fragments.clear();
            maps.generation = maps.generation.wrapping_add(1);
        }
        self.prompt_gates.clear();
        self.fragment_gates.clear();
    }
}
