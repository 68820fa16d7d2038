//! Layered client settings.
//!
//! Sources, later ones winning:
//! 1. Built-in defaults
//! 2. A TOML/JSON/YAML file (`~/.config/relay/config.toml` unless given)
//! 3. `RELAY_*` environment variables, e.g. `RELAY_BASE_URL`

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use relay_domain::{ClientSettings, DomainError};
use tracing::debug;

/// Prefix of the environment variables that override settings.
pub const ENV_PREFIX: &str = "RELAY";

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or did not match the settings shape.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The merged settings are unusable.
    #[error("invalid settings: {0}")]
    Invalid(#[from] DomainError),
}

/// Returns the default settings file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("relay").join("config.toml"))
}

/// Loads settings from defaults, file and environment.
///
/// An explicit `path` must exist; the default file is optional.
///
/// # Errors
///
/// Returns an error if a source is malformed or the base URL is invalid.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings, SettingsError> {
    load_with_env(path, Environment::with_prefix(ENV_PREFIX))
}

fn load_with_env(
    path: Option<&Path>,
    environment: Environment,
) -> Result<ClientSettings, SettingsError> {
    let mut builder = Config::builder();

    match path {
        Some(path) => builder = builder.add_source(File::from(path).required(true)),
        None => {
            if let Some(default) = default_config_path() {
                builder = builder.add_source(File::from(default).required(false));
            }
        }
    }

    // Missing keys fall back to `ClientSettings::default()` through serde.
    let settings: ClientSettings = builder
        .add_source(environment.try_parsing(true))
        .build()?
        .try_deserialize()?;

    settings.validate()?;
    debug!(base_url = %settings.base_url, "settings loaded");
    Ok(settings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "base_url = \"https://api.example.com/api\"\nrefresh_timeout_ms = 2500\n",
        )
        .unwrap();

        let settings = load_with_env(Some(&path), env(&[])).unwrap();

        assert_eq!(settings.base_url, "https://api.example.com/api");
        assert_eq!(settings.refresh_timeout_ms, 2500);
        assert_eq!(settings.refresh_path, "/auth/refresh");
    }

    #[test]
    fn test_environment_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "base_url = \"https://file.example.com\"\n").unwrap();

        let settings = load_with_env(
            Some(&path),
            env(&[
                ("RELAY_BASE_URL", "https://env.example.com"),
                ("RELAY_REQUEST_TIMEOUT_MS", "5000"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.base_url, "https://env.example.com");
        assert_eq!(settings.request_timeout_ms, 5000);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let temp = TempDir::new().unwrap();
        let result = load_with_env(Some(&temp.path().join("missing.toml")), env(&[]));
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "base_url = \"ftp://files.example.com\"\n").unwrap();

        let result = load_with_env(Some(&path), env(&[]));
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }
}
