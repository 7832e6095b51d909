//! Error types
//!
//! Three layers: `RepositoryError` for the storage port, `RenderError` for the
//! template renderer, and `AssemblyError` for everything the registry surfaces.

use thiserror::Error;

/// Errors raised by a [`crate::repository::PromptRepository`] implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested prompt or fragment does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The stored document exists but could not be parsed or failed validation.
    #[error("Invalid document: {0}")]
    Invalid(String),

    /// No repository is configured.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Backend-specific failure (transient or otherwise).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// True when the failure means "does not exist" rather than "could not read".
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

/// Errors raised by the template renderer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("missing required variables: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("circular variable reference: {}", .chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    #[error("variable '{name}' nests deeper than the maximum depth of {max_depth}")]
    DepthExceeded { name: String, max_depth: usize },

    #[error("unresolved template placeholders: {}", .0.join(", "))]
    UnresolvedPlaceholders(Vec<String>),
}

/// Errors surfaced by the prompt assembly engine.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Failed to load prompt config for '{task_type}': {source}")]
    ConfigLoad {
        task_type: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Missing required variables for '{task_type}': {}", .missing.join(", "))]
    MissingRequiredVariables {
        task_type: String,
        missing: Vec<String>,
    },

    #[error("Required fragment '{resolved_name}' (declared as '{original_name}') could not be loaded: {source}")]
    RequiredFragmentMissing {
        resolved_name: String,
        original_name: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Template rendering failed for '{task_type}': {source}")]
    Render {
        task_type: String,
        #[source]
        source: RenderError,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to save prompt config: {0}")]
    Persist(#[source] RepositoryError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for AssemblyError {
    fn from(err: config::ConfigError) -> Self {
        AssemblyError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_lists_every_name() {
        let err = AssemblyError::MissingRequiredVariables {
            task_type: "greet".to_string(),
            missing: vec!["name".to_string(), "place".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("greet"));
        assert!(msg.contains("name, place"));
    }

    #[test]
    fn test_required_fragment_names_both_forms() {
        let err = AssemblyError::RequiredFragmentMissing {
            resolved_name: "persona_us".to_string(),
            original_name: "persona_{{region}}".to_string(),
            source: RepositoryError::NotFound("persona_us".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("persona_us"));
        assert!(msg.contains("persona_{{region}}"));
    }

    #[test]
    fn test_cycle_message_shows_chain() {
        let err = RenderError::CircularReference {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "circular variable reference: a -> b -> a");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(RepositoryError::NotFound("x".to_string()).is_not_found());
        assert!(!RepositoryError::Storage("x".to_string()).is_not_found());
    }
}
