//! Gatherer - Plugin-style Event Collection Agent
//!
//! This crate provides a supervisor that runs pluggable collectors as
//! concurrent Tokio tasks, funnels their events through one bounded buffer,
//! and controls their lifecycle with cancellation propagation. It can be used
//! as a library, or run as a standalone binary with the `gatherer` executable.
//!
//! # Architecture
//!
//! - **Events**: immutable named payloads emitted by collectors
//! - **Collectors**: plugins implementing `init` / `start` / `stop` / `destroy`
//! - **Agent**: state machine owning the registry, the buffer and the sessions
//! - **Config**: YAML configuration for the agent and demo collectors
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gatherer::{AgentBuilder, DemoCollector, DemoConfig, MemorySink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = Arc::new(MemorySink::new());
//!     let mut agent = AgentBuilder::new(16).sink(sink.clone()).build()?;
//!
//!     let rabbit = Arc::new(DemoCollector::new(DemoConfig::new("rabbit", "likes carrots")));
//!     agent.register_collector("rabbit", rabbit).await?;
//!
//!     agent.start().await?;
//!     tokio::time::sleep(std::time::Duration::from_millis(500)).await;
//!     agent.stop().await?;
//!     agent.destroy().await?;
//!
//!     println!("received {} events", sink.len());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod collector;
pub mod config;
mod event;

pub use agent::{
    Agent, AgentBuilder, AgentError, AgentState, CollectorFailure, CollectorFailures,
    EventSender, EventSink, LoggingSink, MemorySink, Phase,
};
pub use collector::{
    Collector, CollectorError, CollectorRegistry, DemoCollector, DemoConfig, EventReceiver,
};
pub use event::Event;
