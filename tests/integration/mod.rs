//! Integration tests for the prompt assembly engine

mod concurrency;
mod end_to_end;
mod invariants;
mod yaml_registry;
