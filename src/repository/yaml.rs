//! Directory of YAML prompt manifests.
//!
//! Layout:
//! - `<root>/<task_type>.yaml` (or any `*.yaml`/`*.yml` whose `spec.task_type` matches)
//! - `<root>/fragments/<name>.yaml` for fragments referenced by name
//! - `<base_dir>/<path>` for fragments referenced by path

use crate::error::RepositoryError;
use crate::prompt::{parse_prompt_manifest, to_prompt_manifest, Fragment, PromptConfig};
use crate::repository::PromptRepository;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const MANIFEST_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

pub struct YamlPromptRepository {
    root: PathBuf,
    fragments_dir: PathBuf,
    /// Explicit task type -> file (relative to root).
    mappings: HashMap<String, String>,
}

impl YamlPromptRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let fragments_dir = root.join("fragments");
        Self {
            root,
            fragments_dir,
            mappings: HashMap::new(),
        }
    }

    pub fn with_mappings(mut self, mappings: HashMap<String, String>) -> Self {
        self.mappings = mappings;
        self
    }

    pub fn with_fragments_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fragments_dir = dir.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a prompt is written to by `save_prompt`.
    pub fn path_for(&self, task_type: &str) -> Result<PathBuf, RepositoryError> {
        let relative = confined(task_type, "task type")?;
        Ok(self.root.join(format!("{}.yaml", relative.display())))
    }

    fn manifest_files(&self) -> Result<Vec<PathBuf>, RepositoryError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read entry in {}: {}", self.root.display(), e);
                    continue;
                }
            };
            if entry.file_type().is_file() && has_manifest_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn read_manifest(&self, path: &Path) -> Result<PromptConfig, RepositoryError> {
        let content = read_file(path)?;
        parse_prompt_manifest(&content).map_err(|e| match e {
            RepositoryError::Invalid(msg) => {
                RepositoryError::Invalid(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    fn fragment_path(
        &self,
        name: &str,
        relative_path: Option<&str>,
        base_dir: Option<&Path>,
    ) -> Result<PathBuf, RepositoryError> {
        if let Some(rel) = relative_path.filter(|p| !p.is_empty()) {
            let rel = confined(rel, "fragment path")?;
            return Ok(base_dir.unwrap_or(&self.root).join(rel));
        }
        confined(name, "fragment name")?;
        Ok(MANIFEST_EXTENSIONS
            .iter()
            .map(|ext| self.fragments_dir.join(format!("{}.{}", name, ext)))
            .find(|p| p.exists())
            .unwrap_or_else(|| self.fragments_dir.join(format!("{}.yaml", name))))
    }
}

impl PromptRepository for YamlPromptRepository {
    fn load_prompt(&self, task_type: &str) -> Result<PromptConfig, RepositoryError> {
        if let Some(file) = self.mappings.get(task_type) {
            return self.read_manifest(&self.root.join(file));
        }

        confined(task_type, "task type")?;
        for ext in MANIFEST_EXTENSIONS {
            let candidate = self.root.join(format!("{}.{}", task_type, ext));
            if !candidate.is_file() {
                continue;
            }
            let config = self.read_manifest(&candidate)?;
            if config.task_type == task_type {
                return Ok(config);
            }
            tracing::debug!(
                "{} declares task type '{}', searching for '{}'",
                candidate.display(),
                config.task_type,
                task_type
            );
        }

        for path in self.manifest_files()? {
            match self.read_manifest(&path) {
                Ok(config) if config.task_type == task_type => return Ok(config),
                Ok(_) => {}
                Err(e) => tracing::debug!("Skipping {} while searching for '{}': {}", path.display(), task_type, e),
            }
        }

        Err(RepositoryError::NotFound(format!(
            "prompt '{}' in {}",
            task_type,
            self.root.display()
        )))
    }

    fn load_fragment(
        &self,
        name: &str,
        relative_path: Option<&str>,
        base_dir: Option<&Path>,
    ) -> Result<Fragment, RepositoryError> {
        let path = self.fragment_path(name, relative_path, base_dir)?;
        let content = read_file(&path)?;

        let mut fragment = if has_manifest_extension(&path) {
            serde_yaml::from_str::<Fragment>(&content).map_err(|e| {
                RepositoryError::Invalid(format!(
                    "Failed to parse fragment {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            // Non-YAML fragment files are taken as raw content.
            Fragment::new(content)
        };
        fragment.source_file = Some(path.display().to_string());
        Ok(fragment)
    }

    fn list_prompts(&self) -> Result<Vec<String>, RepositoryError> {
        let mut task_types: Vec<String> = if !self.mappings.is_empty() {
            self.mappings.keys().cloned().collect()
        } else {
            let mut found = Vec::new();
            for path in self.manifest_files()? {
                match self.read_manifest(&path) {
                    Ok(config) => found.push(config.task_type),
                    Err(e) => tracing::warn!("Skipping invalid prompt manifest: {}", e),
                }
            }
            found
        };
        task_types.sort();
        task_types.dedup();
        Ok(task_types)
    }

    fn save_prompt(&self, config: &PromptConfig) -> Result<(), RepositoryError> {
        if config.task_type.is_empty() {
            return Err(RepositoryError::Invalid(
                "task_type cannot be empty".to_string(),
            ));
        }

        std::fs::create_dir_all(&self.root).map_err(|e| {
            RepositoryError::Storage(format!(
                "Failed to create prompts directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let path = self.path_for(&config.task_type)?;
        let yaml = to_prompt_manifest(config)?;
        std::fs::write(&path, yaml).map_err(|e| {
            RepositoryError::Storage(format!(
                "Failed to write prompt config to {}: {}",
                path.display(),
                e
            ))
        })
    }
}

fn has_manifest_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MANIFEST_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Reject values that would escape the directory they are joined onto.
fn confined<'a>(value: &'a str, what: &str) -> Result<&'a Path, RepositoryError> {
    let path = Path::new(value);
    let escapes = path.components().any(|c| {
        matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
    });
    if escapes {
        return Err(RepositoryError::Invalid(format!(
            "{} '{}' must stay inside the prompts directory",
            what, value
        )));
    }
    Ok(path)
}

fn read_file(path: &Path) -> Result<String, RepositoryError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RepositoryError::NotFound(path.display().to_string())
        } else {
            RepositoryError::IoError(e)
        }
    })
}
