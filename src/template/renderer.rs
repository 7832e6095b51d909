//! Flat `{{name}}` placeholder substitution.
//!
//! Values may themselves contain placeholders; those are resolved recursively
//! along an explicit resolution chain so that cycles are reported instead of
//! silently truncated.

use crate::error::RenderError;
use crate::types::Vars;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Default bound on variable nesting depth.
///
/// Cycle detection already guarantees termination; this only caps recursion
/// so a pathological chain cannot exhaust the stack. It sits well above any
/// nesting a hand-written prompt uses.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// `{{name}}` where name is any run of non-brace characters. Matched literally,
/// so `{{ name }}` only matches a variable called ` name `.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern is valid"));

/// Template renderer
///
/// Lenient by default: placeholders with no matching variable stay in the
/// output as literal text. A strict renderer reports them as an error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateRenderer {
    max_depth: usize,
    strict: bool,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a lenient renderer with the default depth bound
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }

    /// Create a renderer that fails on unresolved placeholders
    pub fn strict() -> Self {
        Self::new().with_strict(true)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the nesting bound. Zero is treated as one.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Render a template against a variable map.
    pub fn render(&self, template: &str, vars: &Vars) -> Result<String, RenderError> {
        if !template.contains("{{") {
            return Ok(template.to_string());
        }

        let mut expansion = Expansion {
            vars,
            max_depth: self.max_depth,
            resolved: HashMap::new(),
            chain: Vec::new(),
            unresolved: Vec::new(),
        };
        let rendered = expansion.expand(template)?;

        if self.strict && !expansion.unresolved.is_empty() {
            return Err(RenderError::UnresolvedPlaceholders(expansion.unresolved));
        }
        Ok(rendered)
    }

    /// Check that every required name is present with a non-empty value.
    ///
    /// Reports all missing names at once, in declaration order.
    pub fn validate_required_vars(&self, required: &[String], vars: &Vars) -> Result<(), RenderError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| vars.get(name.as_str()).map_or(true, |value| value.is_empty()))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RenderError::MissingRequired(missing))
        }
    }
}

/// State for one render call.
struct Expansion<'a> {
    vars: &'a Vars,
    max_depth: usize,
    /// Fully expanded values, keyed by variable name.
    resolved: HashMap<&'a str, String>,
    /// Variables currently being expanded, outermost first.
    chain: Vec<&'a str>,
    unresolved: Vec<String>,
}

impl<'a> Expansion<'a> {
    fn expand(&mut self, text: &str) -> Result<String, RenderError> {
        let vars = self.vars;
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);

            match vars.get_key_value(name.as_str()) {
                Some((key, value)) => {
                    let expanded = self.resolve(key.as_str(), value.as_str())?;
                    out.push_str(&expanded);
                }
                None => {
                    if !self.unresolved.iter().any(|n| n == name.as_str()) {
                        self.unresolved.push(name.as_str().to_string());
                    }
                    out.push_str(whole.as_str());
                }
            }
            last = whole.end();
        }

        out.push_str(&text[last..]);
        Ok(out)
    }

    fn resolve(&mut self, name: &'a str, value: &'a str) -> Result<String, RenderError> {
        if let Some(done) = self.resolved.get(name) {
            return Ok(done.clone());
        }
        if self.chain.contains(&name) {
            let mut chain: Vec<String> = self.chain.iter().map(|n| n.to_string()).collect();
            chain.push(name.to_string());
            return Err(RenderError::CircularReference { chain });
        }
        if self.chain.len() >= self.max_depth {
            return Err(RenderError::DepthExceeded {
                name: name.to_string(),
                max_depth: self.max_depth,
            });
        }

        self.chain.push(name);
        let expanded = self.expand(value);
        self.chain.pop();

        let expanded = expanded?;
        self.resolved.insert(name, expanded.clone());
        Ok(expanded)
    }
}

/// Single, non-recursive substitution pass. Unknown placeholders stay literal.
pub fn substitute_once(text: &str, vars: &Vars) -> String {
    if !text.contains("{{") {
        return text.to_string();
    }
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholder names in order of first appearance.
pub fn find_placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Merge variable maps; later maps win.
pub fn merge_vars(maps: &[&Vars]) -> Vars {
    let mut merged = Vars::with_capacity(maps.iter().map(|m| m.len()).sum());
    for map in maps {
        for (key, value) in map.iter() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Names of variables with non-empty values, sorted.
pub fn used_vars(vars: &Vars) -> Vec<String> {
    let mut used: Vec<String> = vars
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, _)| key.clone())
        .collect();
    used.sort();
    used
}
