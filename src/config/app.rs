//! Application configuration structures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::{
    AgentBuilder, DEFAULT_BUFFER_SIZE, DEFAULT_JOIN_TIMEOUT, DEFAULT_START_GRACE, MAX_BUFFER_SIZE,
};

use super::collector::CollectorsConfig;
use super::validation::{ConfigError, require_positive};

// =============================================================================
// Agent Settings
// =============================================================================

/// Agent supervision settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Event buffer capacity (default: 100).
    pub buffer_size: usize,

    /// How long `start` waits to report collectors failing immediately (default: 20ms).
    #[serde(with = "humantime_serde")]
    pub start_grace: Duration,

    /// How long `stop` waits for each collector task before aborting it (default: 500ms).
    #[serde(with = "humantime_serde")]
    pub join_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            start_grace: DEFAULT_START_GRACE,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }
}

impl AgentSettings {
    /// Agent builder preloaded with these settings.
    pub fn builder(&self) -> AgentBuilder {
        AgentBuilder::new(self.buffer_size)
            .start_grace(self.start_grace)
            .join_timeout(self.join_timeout)
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Agent settings.
    #[serde(default)]
    pub agent: AgentSettings,

    /// Collector configurations grouped by type.
    #[serde(default)]
    pub collectors: CollectorsConfig,

    /// Path to a directory with additional collector config files.
    #[serde(default)]
    pub collector_path: Option<String>,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration including the `collector_path` directory.
    ///
    /// If `collector_path` is specified, scans the directory for YAML files
    /// and merges their collector configurations.
    pub fn load_with_collector_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read_with_collector_path(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file and expand env references without validating.
    ///
    /// Callers applying overrides must call [`validate`](Self::validate) afterwards.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.collectors = config.collectors.expand_env();
        Ok(config)
    }

    /// Like [`read`](Self::read), merging the `collector_path` directory.
    pub fn read_with_collector_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;

        if let Some(ref collector_dir) = config.collector_path {
            let additional = CollectorsConfig::load_from_dir(collector_dir)?;
            config.collectors = config.collectors.merge(additional);
        }

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "agent buffer_size must be positive".to_string(),
            ));
        }
        if self.agent.buffer_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "agent buffer_size must not exceed {MAX_BUFFER_SIZE}"
            )));
        }
        require_positive("agent join_timeout", self.agent.join_timeout)?;

        self.collectors.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::DemoConfig;

    #[test]
    fn test_agent_settings_default() {
        let settings = AgentSettings::default();
        assert_eq!(settings.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(settings.start_grace, DEFAULT_START_GRACE);
        assert_eq!(settings.join_timeout, DEFAULT_JOIN_TIMEOUT);
    }

    #[test]
    fn test_config_parse_with_defaults() {
        let yaml = r#"
collectors:
  demo:
    - name: lion
      content: likes meat
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.agent.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.collectors.demo.len(), 1);
        assert!(config.collector_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_buffer() {
        let config = AppConfig {
            agent: AgentSettings {
                buffer_size: 0,
                ..AgentSettings::default()
            },
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("buffer_size must be positive"));
    }

    #[test]
    fn test_config_validation_oversized_buffer() {
        let config: AppConfig =
            serde_yaml::from_str("agent:\n  buffer_size: 18446744073709551615\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn test_read_defers_validation_to_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "agent:\n  buffer_size: 0\n").unwrap();

        assert!(AppConfig::load(&path).is_err());

        let mut config = AppConfig::read_with_collector_path(&path).unwrap();
        assert_eq!(config.agent.buffer_size, 0);
        config.agent.buffer_size = 8;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_join_timeout() {
        let config = AppConfig {
            agent: AgentSettings {
                join_timeout: Duration::ZERO,
                ..AgentSettings::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_propagates_collector_errors() {
        let config = AppConfig {
            collectors: CollectorsConfig {
                demo: vec![DemoConfig::new("a", "x"), DemoConfig::new("a", "y")],
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_with_collector_path() {
        let dir = tempfile::tempdir().unwrap();
        let extra = dir.path().join("collectors.d");
        std::fs::create_dir(&extra).unwrap();
        std::fs::write(
            extra.join("rabbit.yaml"),
            "demo:\n  - name: rabbit\n    content: likes carrots\n",
        )
        .unwrap();

        let main = dir.path().join("config.yaml");
        std::fs::write(
            &main,
            format!(
                "agent:\n  buffer_size: 2\n  start_grace: 10ms\ncollectors:\n  demo:\n    - name: lion\n      content: likes meat\n      interval: 50ms\ncollector_path: {}\n",
                extra.display()
            ),
        )
        .unwrap();

        let config = AppConfig::load_with_collector_path(&main).unwrap();
        assert_eq!(config.agent.buffer_size, 2);
        assert_eq!(config.agent.start_grace, Duration::from_millis(10));
        let names: Vec<_> = config.collectors.demo.iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["lion", "rabbit"]);

        let agent = config.agent.builder().build().unwrap();
        assert_eq!(agent.buffer_size(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load("/nonexistent/gatherer.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
