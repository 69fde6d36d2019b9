// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub data: DataConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub api_base_url: String,
    pub user_agent: String,
    #[serde(default = "default_accept")]
    pub accept: String,
    pub timeout_seconds: u64,
    pub default_language: String,
    pub default_limit: u32,
}

fn default_accept() -> String {
    "application/vnd.github+json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub csv_path: PathBuf,
    #[serde(default)]
    pub date_policy: DatePolicy,
}

/// What to do with rows whose date cannot be parsed when bucketing by period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    /// Fail the whole operation on the first bad date
    #[default]
    Strict,
    /// Drop the row and log a warning
    SkipAndWarn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = Config::try_from(&Settings::default())?;

        let builder = Config::builder()
            .add_source(defaults)
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
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
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if self.github.api_base_url.is_empty() {
            return Err("GitHub api_base_url cannot be empty".to_string());
        }
        // GitHub rejects requests without a User-Agent
        if self.github.user_agent.is_empty() {
            return Err("GitHub user_agent cannot be empty".to_string());
        }
        if self.github.timeout_seconds == 0 {
            return Err("GitHub timeout_seconds must be greater than 0".to_string());
        }
        if !(1..=100).contains(&self.github.default_limit) {
            return Err("GitHub default_limit must be between 1 and 100".to_string());
        }
        if self.github.default_language.trim().is_empty() {
            return Err("GitHub default_language cannot be empty".to_string());
        }

        if self.data.csv_path.as_os_str().is_empty() {
            return Err("Data csv_path cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            github: GitHubConfig {
                api_base_url: "https://api.github.com".to_string(),
                user_agent: concat!("repo-explorer/", env!("CARGO_PKG_VERSION")).to_string(),
                accept: default_accept(),
                timeout_seconds: 30,
                default_language: "python".to_string(),
                default_limit: 10,
            },
            data: DataConfig {
                csv_path: PathBuf::from("github_data.csv"),
                date_policy: DatePolicy::Strict,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_zero_port() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_empty_api_base() {
        let mut settings = Settings::default();
        settings.github.api_base_url = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_out_of_range_limit() {
        let mut settings = Settings::default();
        settings.github.default_limit = 0;
        assert!(settings.validate().is_err());
        settings.github.default_limit = 101;
        assert!(settings.validate().is_err());
        settings.github.default_limit = 100;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_date_policy_deserializes_snake_case() {
        let policy: DatePolicy = serde_json::from_str("\"skip_and_warn\"").unwrap();
        assert_eq!(policy, DatePolicy::SkipAndWarn);
        assert_eq!(DatePolicy::default(), DatePolicy::Strict);
    }
}
