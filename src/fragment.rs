//! Fragment Resolution
//!
//! Turns a prompt's fragment references into variables: names and paths are
//! substituted once against the caller's vars, fragments are loaded through
//! the shared cache, and their content is injected verbatim.

pub mod resolver;

pub use resolver::FragmentResolver;
