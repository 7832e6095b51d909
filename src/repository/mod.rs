//! Prompt repository port and adapters.

pub mod contract;
pub mod memory;
pub mod yaml;

pub use contract::PromptRepository;
pub use memory::InMemoryPromptRepository;
pub use yaml::YamlPromptRepository;
