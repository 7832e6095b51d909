//! Tooling & Integration Layer
//!
//! Command-line access to the prompt registry.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
