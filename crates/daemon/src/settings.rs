//! Daemon settings
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `TOKEN_DISPLAY_*` environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use token_display_core::DisplayConfig;

const ENV_PREFIX: &str = "TOKEN_DISPLAY";
const DEFAULT_DB_PATH: &str = "~/.token-display/display.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub cache_ttl_secs: u64,
    pub refresh_interval_secs: u64,
    pub cache_sweep_interval_secs: u64,
    pub log_format: LogFormat,
    pub log_dir: Option<String>,
}

impl Settings {
    /// Load settings from the process environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_from(file, None)
    }

    /// Load settings with an explicit environment map (None reads the process env)
    pub fn load_from(file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080_i64)?
            .set_default("cache_ttl_secs", 15_i64)?
            .set_default("refresh_interval_secs", 5_i64)?
            .set_default("cache_sweep_interval_secs", 60_i64)?
            .set_default("log_format", "pretty")?;

        if let Some(path) = file {
            let path_str = path
                .to_str()
                .with_context(|| format!("Config path is not UTF-8: {}", path.display()))?;
            builder = builder.add_source(File::new(path_str, FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Database file path with `~` expanded
    pub fn expanded_db_path(&self) -> String {
        shellexpand::tilde(&self.db_path).into_owned()
    }

    pub fn database_url(&self) -> String {
        format!("sqlite://{}", self.expanded_db_path())
    }

    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig::from_secs(self.cache_ttl_secs, self.refresh_interval_secs.max(1))
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs.max(1))
    }

    pub fn log_dir(&self) -> Option<String> {
        self.log_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .map(|dir| shellexpand::tilde(dir).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_from(None, env(&[])).unwrap();

        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.log_format, LogFormat::Pretty);
        assert!(settings.log_dir().is_none());
        assert_eq!(settings.display_config(), DisplayConfig::default());
        assert_eq!(settings.cache_sweep_interval(), Duration::from_secs(60));
        assert!(!settings.expanded_db_path().starts_with('~'));
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::load_from(
            None,
            env(&[
                ("TOKEN_DISPLAY_CACHE_TTL_SECS", "0"),
                ("TOKEN_DISPLAY_PORT", "9090"),
                ("TOKEN_DISPLAY_LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.port, 9090);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert!(!settings.display_config().caching_enabled());
    }

    #[test]
    fn test_zero_refresh_interval_is_clamped() {
        let settings = Settings::load_from(
            None,
            env(&[("TOKEN_DISPLAY_REFRESH_INTERVAL_SECS", "0")]),
        )
        .unwrap();

        assert_eq!(settings.refresh_interval_secs, 0);
        assert_eq!(
            settings.display_config().refresh_interval,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_file_then_env() {
        let path = std::env::temp_dir().join(format!(
            "token-display-settings-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "db_path = \"/tmp/display-test.db\"\nport = 7000\nrefresh_interval_secs = 10\n",
        )
        .unwrap();

        let settings =
            Settings::load_from(Some(&path), env(&[("TOKEN_DISPLAY_PORT", "7001")])).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.database_url(), "sqlite:///tmp/display-test.db");
        assert_eq!(settings.port, 7001);
        assert_eq!(settings.refresh_interval_secs, 10);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Settings::load_from(
            Some(Path::new("/nonexistent/token-display.toml")),
            env(&[]),
        );
        assert!(result.is_err());
    }
}
