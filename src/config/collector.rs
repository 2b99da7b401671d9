//! Collector configuration structures.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collector::DemoConfig;

use super::validation::{ConfigError, expand_env_vars};

/// Collectors configuration grouped by type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectorsConfig {
    /// Demo collectors.
    #[serde(default)]
    pub demo: Vec<DemoConfig>,
}

impl CollectorsConfig {
    /// Merge another CollectorsConfig into this one.
    #[must_use]
    pub fn merge(mut self, other: CollectorsConfig) -> Self {
        self.demo.extend(other.demo);
        self
    }

    /// Expand `${VAR}` references in collector payloads.
    #[must_use]
    pub fn expand_env(mut self) -> Self {
        for demo in &mut self.demo {
            demo.content = expand_env_vars(&demo.content);
        }
        self
    }

    /// Enabled demo collector configurations.
    pub fn enabled_demo(&self) -> impl Iterator<Item = &DemoConfig> {
        self.demo.iter().filter(|d| d.enabled)
    }

    /// Validate all collector configurations.
    ///
    /// Names must be non-empty and unique across all collector types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen_names = HashSet::new();

        for demo in &self.demo {
            if demo.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "demo collector name cannot be empty".to_string(),
                ));
            }
            if !seen_names.insert(&demo.name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate collector name: '{}'",
                    demo.name
                )));
            }
            demo.validate().map_err(|e| {
                ConfigError::ValidationError(format!("demo collector '{}': {}", demo.name, e))
            })?;
        }

        Ok(())
    }

    /// Load collector configurations from all YAML files in a directory.
    pub fn load_from_dir(dir_path: &str) -> Result<Self, ConfigError> {
        let dir = Path::new(dir_path);
        if !dir.is_dir() {
            return Err(ConfigError::ValidationError(format!(
                "collector_path '{}' is not a directory",
                dir_path
            )));
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        // Deterministic merge order.
        paths.sort();

        let mut merged = Self::default();
        for path in paths {
            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "yaml" && ext != "yml" {
                continue;
            }

            tracing::debug!(path = %path.display(), "Loading collector config");
            let content = std::fs::read_to_string(&path)?;
            let file_config: Self = serde_yaml::from_str(&content).map_err(|e| {
                ConfigError::ValidationError(format!("failed to parse '{}': {}", path.display(), e))
            })?;

            merged = merged.merge(file_config.expand_env());
        }

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_collectors_config_merge() {
        let a = CollectorsConfig {
            demo: vec![DemoConfig::new("lion", "likes meat")],
        };
        let b = CollectorsConfig {
            demo: vec![DemoConfig::new("rabbit", "likes carrots")],
        };

        let merged = a.merge(b);
        assert_eq!(merged.demo.len(), 2);
        assert_eq!(merged.demo[1].name, "rabbit");
    }

    #[test]
    fn test_validate_duplicate_names() {
        let config = CollectorsConfig {
            demo: vec![DemoConfig::new("dup", "a"), DemoConfig::new("dup", "b")],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate collector name"));
    }

    #[test]
    fn test_validate_empty_name() {
        let config = CollectorsConfig {
            demo: vec![DemoConfig::new("", "a")],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_zero_interval() {
        let config = CollectorsConfig {
            demo: vec![DemoConfig::new("fast", "a").with_interval(Duration::ZERO)],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("demo collector 'fast'"));
    }

    #[test]
    fn test_enabled_demo_skips_disabled() {
        let config = CollectorsConfig {
            demo: vec![
                DemoConfig::new("on", "a"),
                DemoConfig::new("off", "b").with_enabled(false),
            ],
        };
        let names: Vec<_> = config.enabled_demo().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["on"]);
    }

    #[test]
    fn test_demo_config_serde_full() {
        let yaml = r#"
demo:
  - name: lion
    content: likes meat
    enabled: false
    interval: 100ms
    stop_timeout: 1s
    max_events: 3
"#;
        let config: CollectorsConfig = serde_yaml::from_str(yaml).unwrap();
        let lion = &config.demo[0];
        assert!(!lion.enabled);
        assert_eq!(lion.interval, Duration::from_millis(100));
        assert_eq!(lion.stop_timeout, Duration::from_secs(1));
        assert_eq!(lion.max_events, Some(3));
    }

    #[test]
    fn test_load_from_dir_merges_yaml_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.yaml"),
            "demo:\n  - name: lion\n    content: likes ${GATHERER_TEST_UNSET_FOOD:-meat}\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.yml"),
            "demo:\n  - name: rabbit\n    content: likes carrots\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let config = CollectorsConfig::load_from_dir(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.demo.len(), 2);
        assert_eq!(config.demo[0].content, "likes meat");
        assert_eq!(config.demo[1].name, "rabbit");
    }

    #[test]
    fn test_load_from_missing_dir() {
        let err = CollectorsConfig::load_from_dir("/nonexistent/gatherer/collectors").unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }
}
