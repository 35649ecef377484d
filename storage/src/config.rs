// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub storage: FtpStorageConfig,
    pub observability: ObservabilityConfig,
}

/// Connection settings for the FTP storage backend
///
/// Immutable after load; the adapter takes it by value at construction and
/// never mutates it, so concurrent operations share it read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpStorageConfig {
    /// URI-style prefix such that `base_path + name` addresses a file,
    /// e.g. `ftp://files.example.com/docs/`
    pub base_path: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Settings {
    /// Load configuration with layered precedence: defaults file → local file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment overrides, e.g. APP__STORAGE__PASSWORD
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()?;

        if self.observability.log_level.is_empty() {
            return Err("Log level must not be empty".to_string());
        }

        Ok(())
    }
}

impl FtpStorageConfig {
    /// Validate storage connection settings
    pub fn validate(&self) -> Result<(), String> {
        if self.base_path.is_empty() {
            return Err("Storage base path must not be empty".to_string());
        }

        if !self.base_path.ends_with('/') {
            return Err(format!(
                "Storage base path '{}' must end with '/' so that base_path + name addresses a file",
                self.base_path
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("Storage timeout must be greater than 0 seconds".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_default_toml(dir: &TempDir, contents: &str) {
        fs::write(dir.path().join("default.toml"), contents).unwrap();
    }

    #[test]
    fn test_load_from_path() {
        let dir = TempDir::new().unwrap();
        write_default_toml(
            &dir,
            r#"
[storage]
base_path = "ftp://files.example.com/docs/"
username = "wopi"
password = "secret"
timeout_seconds = 15

[observability]
log_level = "info"
"#,
        );

        let settings = Settings::load_from_path(dir.path()).unwrap();
        assert_eq!(settings.storage.base_path, "ftp://files.example.com/docs/");
        assert_eq!(settings.storage.username, "wopi");
        assert_eq!(settings.storage.timeout_seconds, 15);
        assert_eq!(settings.observability.log_level, "info");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_timeout_defaults_when_omitted() {
        let dir = TempDir::new().unwrap();
        write_default_toml(
            &dir,
            r#"
[storage]
base_path = "ftp://files.example.com/docs/"
username = "wopi"
password = "secret"

[observability]
log_level = "debug"
"#,
        );

        let settings = Settings::load_from_path(dir.path()).unwrap();
        assert_eq!(settings.storage.timeout_seconds, 30);
    }

    #[test]
    fn test_local_toml_overrides_default() {
        let dir = TempDir::new().unwrap();
        write_default_toml(
            &dir,
            r#"
[storage]
base_path = "ftp://files.example.com/docs/"
username = "wopi"
password = "default-secret"

[observability]
log_level = "info"
"#,
        );
        fs::write(
            dir.path().join("local.toml"),
            r#"
[storage]
password = "local-secret"
"#,
        )
        .unwrap();

        let settings = Settings::load_from_path(dir.path()).unwrap();
        assert_eq!(settings.storage.password, "local-secret");
    }

    #[test]
    fn test_validate_rejects_missing_trailing_slash() {
        let config = FtpStorageConfig {
            base_path: "ftp://files.example.com/docs".to_string(),
            username: "wopi".to_string(),
            password: "secret".to_string(),
            timeout_seconds: 30,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_base_path() {
        let config = FtpStorageConfig {
            base_path: String::new(),
            username: "wopi".to_string(),
            password: "secret".to_string(),
            timeout_seconds: 30,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = FtpStorageConfig {
            base_path: "ftp://files.example.com/docs/".to_string(),
            username: "wopi".to_string(),
            password: "secret".to_string(),
            timeout_seconds: 0,
        };
        assert!(config.validate().is_err());
    }
}
