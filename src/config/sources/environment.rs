//! Environment variable source: PROMPTLOOM prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "PROMPTLOOM";

/// Add environment variable overlay to builder.
///
/// `PROMPTLOOM__RENDER__STRICT=true` sets `render.strict`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(environment()))
}

/// Same overlay, reading from an explicit map instead of the process environment.
pub fn add_map_to_builder(
    builder: ConfigBuilder<DefaultState>,
    vars: config::Map<String, String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(environment().source(Some(vars))))
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
