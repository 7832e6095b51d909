//! Template Rendering
//!
//! Flat `{{name}}` substitution with transitive resolution, cycle detection and
//! required-variable validation. No conditionals, loops or filters.

pub mod renderer;

pub use renderer::{
    find_placeholders, merge_vars, substitute_once, used_vars, TemplateRenderer, DEFAULT_MAX_DEPTH,
};
