use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::cursor::DEFAULT_PAGE;
use crate::fetch::{FetchConfig, DEFAULT_SOURCE_URL};
use crate::store::DEFAULT_RETENTION_DAYS;
use crate::sync::{SyncOptions, DEFAULT_SYNC_INTERVAL};

/// File name of the meal store inside the data directory.
pub const STORE_FILE: &str = "meals.json";
/// File name of the cursor inside the data directory.
pub const CURSOR_FILE: &str = "WEEK_NO";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    fn default(value: T) -> Self {
        Self::new(value, ConfigSource::Default)
    }

    fn from_file(&mut self, value: Option<T>) {
        if let Some(value) = value {
            *self = Self::new(value, ConfigSource::File);
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the store and cursor files
    pub data_dir: ConfigValue<PathBuf>,
    /// Upstream menu page
    pub source_url: ConfigValue<String>,
    /// Days of history kept before eviction
    pub retention_days: ConfigValue<u64>,
    /// Cursor value used when no cursor file exists
    pub initial_page: ConfigValue<u64>,
    /// HTTP listen port
    pub port: ConfigValue<u16>,
    /// Seconds between scheduled syncs
    pub sync_interval_secs: ConfigValue<u64>,
    /// Upstream request timeout in seconds
    pub request_timeout_secs: ConfigValue<u64>,
    /// Offset from UTC, in hours, that defines "today"
    pub utc_offset_hours: ConfigValue<i32>,
    /// Retry a failed page on the next sync instead of skipping it
    pub rollback_on_fetch_error: ConfigValue<bool>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    source_url: Option<String>,
    retention_days: Option<u64>,
    initial_page: Option<u64>,
    port: Option<u16>,
    sync_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    utc_offset_hours: Option<i32>,
    rollback_on_fetch_error: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: ConfigValue::default(Self::default_data_dir()),
            source_url: ConfigValue::default(DEFAULT_SOURCE_URL.to_string()),
            retention_days: ConfigValue::default(DEFAULT_RETENTION_DAYS),
            initial_page: ConfigValue::default(DEFAULT_PAGE),
            port: ConfigValue::default(5000),
            sync_interval_secs: ConfigValue::default(DEFAULT_SYNC_INTERVAL.as_secs()),
            request_timeout_secs: ConfigValue::default(20),
            utc_offset_hours: ConfigValue::default(9),
            rollback_on_fetch_error: ConfigValue::default(true),
            config_file: None,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            // Resolve a relative data_dir against the config file's directory
            let data_dir = file.data_dir.map(|dir| match path.parent() {
                Some(parent) if dir.is_relative() => parent.join(dir),
                _ => dir,
            });

            config.data_dir.from_file(data_dir);
            config.source_url.from_file(file.source_url);
            config.retention_days.from_file(file.retention_days);
            config.initial_page.from_file(file.initial_page);
            config.port.from_file(file.port);
            config.sync_interval_secs.from_file(file.sync_interval_secs);
            config.request_timeout_secs.from_file(file.request_timeout_secs);
            config.utc_offset_hours.from_file(file.utc_offset_hours);
            config
                .rollback_on_fetch_error
                .from_file(file.rollback_on_fetch_error);
            config.config_file = Some(path);
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("MEALCACHE_DATA_DIR") {
            config.data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("MEALCACHE_SOURCE_URL") {
            config.source_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        env_override("MEALCACHE_RETENTION_DAYS", &mut config.retention_days)?;
        env_override("MEALCACHE_INITIAL_PAGE", &mut config.initial_page)?;
        env_override("MEALCACHE_PORT", &mut config.port)?;
        env_override("MEALCACHE_SYNC_INTERVAL_SECS", &mut config.sync_interval_secs)?;
        env_override("MEALCACHE_REQUEST_TIMEOUT_SECS", &mut config.request_timeout_secs)?;
        env_override("MEALCACHE_UTC_OFFSET_HOURS", &mut config.utc_offset_hours)?;
        env_override(
            "MEALCACHE_ROLLBACK_ON_FETCH_ERROR",
            &mut config.rollback_on_fetch_error,
        )?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sync_interval_secs.value == 0 {
            return Err(ConfigError::InvalidValue(
                "sync_interval_secs".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs.value == 0 {
            return Err(ConfigError::InvalidValue(
                "request_timeout_secs".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if !(-23..=23).contains(&self.utc_offset_hours.value) {
            return Err(ConfigError::InvalidValue(
                "utc_offset_hours".to_string(),
                "must be between -23 and 23".to_string(),
            ));
        }
        Ok(())
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.value.join(STORE_FILE)
    }

    pub fn cursor_path(&self) -> PathBuf {
        self.data_dir.value.join(CURSOR_FILE)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.value)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            source_url: self.source_url.value.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs.value),
            ..FetchConfig::default()
        }
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            rollback_on_fetch_error: self.rollback_on_fetch_error.value,
        }
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/mealcache/
    /// - macOS: ~/Library/Application Support/mealcache/
    /// - Windows: %APPDATA%/mealcache/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mealcache")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/mealcache/
    /// - macOS: ~/Library/Application Support/mealcache/
    /// - Windows: %APPDATA%/mealcache/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mealcache")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn env_override<T: FromStr>(name: &str, target: &mut ConfigValue<T>) -> Result<(), ConfigError> {
    if let Ok(raw) = std::env::var(name) {
        let value = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), raw.clone()))?;
        *target = ConfigValue::new(value, ConfigSource::Environment);
    }
    Ok(())
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl ConfigError {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::ReadError(path, _) | ConfigError::ParseError(path, _) => Some(path),
            ConfigError::InvalidValue(_, _) => None,
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value for {}: {}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.data_dir.value.ends_with("mealcache"));
        assert_eq!(config.retention_days.value, 30);
        assert_eq!(config.initial_page.value, 219);
        assert_eq!(config.source_url.source, ConfigSource::Default);
        assert!(config.config_file.is_none());
        assert!(config.store_path().ends_with("meals.json"));
        assert!(config.cursor_path().ends_with("WEEK_NO"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /srv/meals").unwrap();
        writeln!(file, "retention_days: 14").unwrap();
        writeln!(file, "port: 8081").unwrap();
        writeln!(file, "rollback_on_fetch_error: false").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/srv/meals"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.retention_days.value, 14);
        assert_eq!(config.port.value, 8081);
        assert!(!config.sync_options().rollback_on_fetch_error);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: state\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("state"));
    }

    // Variable names here are not read by Config::load, so parallel tests
    // loading config are unaffected.
    #[test]
    fn test_env_var_overrides_file() {
        let mut page = ConfigValue::new(100u64, ConfigSource::File);

        std::env::set_var("MEALCACHE_TEST_OVERRIDE_PAGE", " 300 ");
        let result = env_override("MEALCACHE_TEST_OVERRIDE_PAGE", &mut page);
        std::env::remove_var("MEALCACHE_TEST_OVERRIDE_PAGE");

        result.unwrap();
        assert_eq!(page.value, 300);
        assert_eq!(page.source, ConfigSource::Environment);
    }

    #[test]
    fn test_unset_env_var_keeps_value() {
        let mut port = ConfigValue::new(5000u16, ConfigSource::Default);
        env_override("MEALCACHE_TEST_UNSET_PORT", &mut port).unwrap();
        assert_eq!(port.value, 5000);
        assert_eq!(port.source, ConfigSource::Default);
    }

    #[test]
    fn test_invalid_env_value() {
        let mut offset = ConfigValue::new(9i32, ConfigSource::Default);

        std::env::set_var("MEALCACHE_TEST_BAD_OFFSET", "nine");
        let result = env_override("MEALCACHE_TEST_BAD_OFFSET", &mut offset);
        std::env::remove_var("MEALCACHE_TEST_BAD_OFFSET");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("MEALCACHE_TEST_BAD_OFFSET"));
        assert_eq!(offset.value, 9);
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let err = Config::load(Some(config_path.clone())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        assert_eq!(err.path(), Some(config_path.as_path()));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "sync_interval_secs: 0\n").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == "sync_interval_secs"));
    }

    #[test]
    fn test_fetch_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "source_url: http://localhost:9000/menu\nrequest_timeout_secs: 5\n",
        )
        .unwrap();

        let fetch = Config::load(Some(config_path)).unwrap().fetch_config();
        assert_eq!(fetch.source_url, "http://localhost:9000/menu");
        assert_eq!(fetch.timeout, Duration::from_secs(5));
    }
}
