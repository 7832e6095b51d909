use crate::cache::AssemblyCache;
use crate::error::{AssemblyError, RepositoryError};
use crate::prompt::{Fragment, FragmentRef};
use crate::repository::PromptRepository;
use crate::template::substitute_once;
use crate::types::Vars;
use std::path::Path;
use std::sync::Arc;

/// Loads fragment references and turns them into variables.
pub struct FragmentResolver {
    repository: Arc<dyn PromptRepository>,
    cache: Arc<AssemblyCache>,
}

impl FragmentResolver {
    pub fn new(repository: Arc<dyn PromptRepository>, cache: Arc<AssemblyCache>) -> Self {
        Self { repository, cache }
    }

    /// Resolve every reference in declaration order.
    ///
    /// Names and paths get one substitution pass against `vars`. Each loaded
    /// fragment becomes `vars[resolved_name] = content`; a later reference
    /// with the same resolved name overwrites an earlier one.
    pub fn assemble_fragments(
        &self,
        fragments: &[FragmentRef],
        vars: &Vars,
        base_dir: Option<&Path>,
    ) -> Result<Vars, AssemblyError> {
        let mut fragment_vars = Vars::new();

        for fragment_ref in fragments {
            let resolved_name = substitute_once(&fragment_ref.name, vars);
            let resolved_path = fragment_ref
                .path
                .as_deref()
                .map(|p| substitute_once(p, vars))
                .filter(|p| !p.is_empty());

            match self.load_fragment(&resolved_name, resolved_path.as_deref(), base_dir) {
                Ok(fragment) => {
                    tracing::debug!(
                        fragment = %resolved_name,
                        original = %fragment_ref.name,
                        "Resolved fragment"
                    );
                    fragment_vars.insert(resolved_name, fragment.content);
                }
                Err(source) if fragment_ref.required => {
                    return Err(AssemblyError::RequiredFragmentMissing {
                        resolved_name,
                        original_name: fragment_ref.name.clone(),
                        source,
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        fragment = %resolved_name,
                        error = %e,
                        "Skipping optional fragment"
                    );
                }
            }
        }

        Ok(fragment_vars)
    }

    /// Load through the cache, keyed by path when one is given.
    pub fn load_fragment(
        &self,
        name: &str,
        relative_path: Option<&str>,
        base_dir: Option<&Path>,
    ) -> Result<Fragment, RepositoryError> {
        let key = relative_path.unwrap_or(name);
        self.cache.get_or_load_fragment(key, || {
            self.repository.load_fragment(name, relative_path, base_dir)
        })
    }
}
