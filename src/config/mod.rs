//! Configuration module for the gatherer agent.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Agent settings (buffer size, start grace, join timeout)
//! - Demo collector definitions
//! - Collector include directory

mod app;
mod collector;
mod validation;

pub use app::{AgentSettings, AppConfig};
pub use collector::CollectorsConfig;
pub use validation::{ConfigError, expand_env_vars, parse_duration};
