//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use ifn_core::config::{parse_url, CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Name of the configuration file looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "ifn.toml";

/// Resolve which configuration file to read, if any. An explicit path must
/// exist; the default file is optional.
pub fn config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }
    let default = std::env::current_dir()?.join(CONFIG_FILE_NAME);
    Ok(default.is_file().then_some(default))
}

/// Load layered configuration: defaults, file, environment, then flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_path(cli.config.as_deref())? {
        tracing::debug!("Reading configuration from {}", path.display());
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(CliConfigOverrides {
        api_url: cli.api_url.as_deref().map(|u| parse_url("api_url", u)).transpose()?,
        auth_url: cli.auth_url.as_deref().map(|u| parse_url("auth_url", u)).transpose()?,
        access_token: cli.token.clone(),
        email: cli.email.clone(),
    });
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_explicit_path_is_used_even_if_missing() {
        let path = PathBuf::from("/nonexistent/ifn.toml");
        assert_eq!(config_path(Some(&path)).unwrap(), Some(path));
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"api_url = "https://ifn.example/api-root""#).unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();
        assert_eq!(config.api_url.value, "https://ifn.example/api-root");
    }
}
