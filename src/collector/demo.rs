//! Reference collector emitting a fixed event on an interval.
//!
//! - [`DemoCollector`]: emits `Event(name, content)` until cancelled

mod collector;

pub use collector::{DemoCollector, DemoConfig};
