//! Agent builder.
//!
//! Provides a builder pattern for configuring the event buffer, the consumer
//! sink, and the supervision timeouts before constructing an [`Agent`].

use std::sync::Arc;
use std::time::Duration;

use crate::agent::{Agent, AgentError, EventSink, LoggingSink};

/// Default event buffer capacity.
pub const DEFAULT_BUFFER_SIZE: usize = 100;

/// Largest event buffer capacity a Tokio channel accepts.
pub const MAX_BUFFER_SIZE: usize = tokio::sync::Semaphore::MAX_PERMITS;

/// Default time `start` waits for collectors that fail immediately.
pub const DEFAULT_START_GRACE: Duration = Duration::from_millis(20);

/// Default time `stop` waits for each collector task before aborting it.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Builder for constructing an [`Agent`].
pub struct AgentBuilder {
    buffer_size: usize,
    sink: Arc<dyn EventSink>,
    start_grace: Duration,
    join_timeout: Duration,
}

impl AgentBuilder {
    /// Create a new builder with the given event buffer capacity.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            sink: Arc::new(LoggingSink),
            start_grace: DEFAULT_START_GRACE,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }

    /// Set the sink the consumer task hands events to (default: [`LoggingSink`]).
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Set how long `start` waits to report collectors that fail immediately.
    ///
    /// Zero disables the wait; failures are then reported by `stop`.
    pub fn start_grace(mut self, grace: Duration) -> Self {
        self.start_grace = grace;
        self
    }

    /// Set how long `stop` waits for each collector task before aborting it.
    pub fn join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Build the agent.
    ///
    /// # Errors
    /// Returns `AgentError::InvalidBufferSize` if the buffer capacity is zero
    /// or above [`MAX_BUFFER_SIZE`].
    pub fn build(self) -> Result<Agent, AgentError> {
        if self.buffer_size == 0 || self.buffer_size > MAX_BUFFER_SIZE {
            return Err(AgentError::InvalidBufferSize(self.buffer_size));
        }

        Ok(Agent::from_parts(
            self.buffer_size,
            self.sink,
            self.start_grace,
            self.join_timeout,
        ))
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}
