//! Collector Layer
//!
//! Pluggable collectors that deliver events to the agent through an
//! [`EventReceiver`]. Each collector runs in its own Tokio task while a
//! session is active.
//!
//! # Architecture
//!
//! - [`Collector`]: lifecycle contract (`init`, `start`, `stop`, `destroy`)
//! - [`EventReceiver`]: sink accepting one event at a time
//! - [`CollectorRegistry`]: ordered name to collector map owned by the agent
//! - [`DemoCollector`]: reference implementation
//!
//! # Example
//!
//! ```rust
//! use gatherer::{DemoCollector, DemoConfig};
//! use std::time::Duration;
//!
//! let config = DemoConfig::new("rabbit", "likes carrots")
//!     .with_interval(Duration::from_millis(100))
//!     .with_max_events(3);
//! let collector = DemoCollector::new(config);
//! assert_eq!(collector.name(), "rabbit");
//! ```

pub mod demo;
mod registry;
mod traits;

pub use demo::{DemoCollector, DemoConfig};
pub use registry::CollectorRegistry;
pub use traits::{Collector, CollectorError, DEFAULT_STOP_TIMEOUT, EventReceiver};
