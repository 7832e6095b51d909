//! Core types shared across the prompt assembly engine.

use std::collections::HashMap;

/// Vars: flat variable bindings, name -> value
pub type Vars = HashMap<String, String>;

/// ContentHash: SHA-256 digest of rendered prompt text
pub type ContentHash = [u8; 32];
