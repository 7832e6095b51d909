//! XDG Base Directory locations for promptloom.

use crate::error::AssemblyError;
use std::path::PathBuf;

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Result<PathBuf, AssemblyError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Ok(PathBuf::from(xdg_config_home));
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        AssemblyError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// `$XDG_CONFIG_HOME/promptloom/`
pub fn app_config_dir() -> Result<PathBuf, AssemblyError> {
    Ok(config_home()?.join("promptloom"))
}

/// `$XDG_CONFIG_HOME/promptloom/config.toml`
pub fn global_config_path() -> Result<PathBuf, AssemblyError> {
    Ok(app_config_dir()?.join("config.toml"))
}

/// Default prompt manifest directory: `$XDG_CONFIG_HOME/promptloom/prompts/`.
///
/// Not created here; a missing directory reads as an empty repository.
pub fn prompts_dir() -> Result<PathBuf, AssemblyError> {
    Ok(app_config_dir()?.join("prompts"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_nest_under_app_dir() {
        let (Ok(app), Ok(global), Ok(prompts)) = (app_config_dir(), global_config_path(), prompts_dir())
        else {
            // No HOME in this environment.
            return;
        };
        assert!(app.ends_with("promptloom"));
        assert_eq!(global, app.join("config.toml"));
        assert_eq!(prompts, app.join("prompts"));
    }
}
