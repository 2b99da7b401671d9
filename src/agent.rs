//! Agent Layer
//!
//! Supervisor running pluggable collectors as concurrent tasks that deliver
//! events into one bounded buffer drained by a consumer task.
//!
//! # Architecture
//!
//! - [`Agent`]: state machine owning the collector registry and the sessions
//! - [`AgentBuilder`]: buffer capacity, sink and timeouts
//! - [`EventSender`]: receiver handle collectors use to deliver events
//! - [`EventSink`]: what the consumer task does with each event
//!
//! Each call to [`Agent::start`] opens a session with a fresh cancellation
//! token and event channel. [`Agent::stop`] cancels the token and joins every
//! task of the session before returning, so a later session never receives
//! events from an earlier one.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gatherer::{Agent, DemoCollector, DemoConfig};
//!
//! # async fn run() -> Result<(), gatherer::AgentError> {
//! let mut agent = Agent::new(100);
//! let lion = Arc::new(DemoCollector::new(DemoConfig::new("lion", "likes meat")));
//! agent.register_collector("lion", lion).await?;
//!
//! agent.start().await?;
//! tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//! agent.stop().await?;
//! agent.destroy().await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod consumer;
mod error;
mod sender;
mod sink;
mod state;
mod supervisor;

pub use builder::{
    AgentBuilder, DEFAULT_BUFFER_SIZE, DEFAULT_JOIN_TIMEOUT, DEFAULT_START_GRACE, MAX_BUFFER_SIZE,
};
pub use error::{AgentError, CollectorFailure, CollectorFailures, Phase};
pub use sender::EventSender;
pub use sink::{EventSink, LoggingSink, MemorySink};
pub use state::{AgentState, Operation};
pub use supervisor::Agent;
