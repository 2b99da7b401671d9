//! Core collector traits and types.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::Event;

/// Default upper bound a collector waits for its task to acknowledge a stop.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors reported by collectors and by event delivery.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// `start` was called before `init` wired an event receiver.
    #[error("collector not initialized")]
    NotInitialized,

    /// `init` was called on an already wired collector.
    #[error("collector already initialized")]
    AlreadyInitialized,

    /// The event receiver no longer accepts events (no running session).
    #[error("event receiver closed")]
    ReceiverClosed,

    /// The collector task did not acknowledge cancellation in time.
    #[error("failed to stop: timed out after {0:?}")]
    StopTimeout(Duration),

    /// Any other collector-defined failure.
    #[error("{0}")]
    Failed(String),

    /// The collector task panicked.
    #[error("collector task panicked: {0}")]
    Panicked(String),

    /// The collector task was aborted by the agent.
    #[error("collector task aborted")]
    Aborted,
}

/// Sink accepting one event at a time.
///
/// Implemented by the agent; collectors receive one in [`Collector::init`].
/// `on_event` waits while the agent's buffer is full.
#[async_trait::async_trait]
pub trait EventReceiver: Send + Sync + 'static {
    /// Deliver one event.
    ///
    /// # Errors
    /// Returns `CollectorError::ReceiverClosed` if no session is running.
    async fn on_event(&self, event: Event) -> Result<(), CollectorError>;
}

/// Lifecycle contract every pluggable collector implements.
///
/// The agent shares each collector between itself and the collector's running
/// task, so all methods take `&self`; implementations keep mutable state
/// behind interior mutability.
///
/// # Lifecycle
///
/// 1. `init` once, while the agent is waiting, to wire the event receiver
/// 2. `start` in a dedicated task; runs until the token is cancelled
/// 3. `stop` after cancellation; waits (bounded) for `start` to acknowledge
/// 4. `destroy` once the agent is idle again
///
/// `start` must observe the token on every iteration, not only at entry, and
/// must never spin without yielding.
#[async_trait::async_trait]
pub trait Collector: Send + Sync + 'static {
    /// Wire the collector to its output sink.
    async fn init(&self, receiver: Arc<dyn EventReceiver>) -> Result<(), CollectorError>;

    /// Produce events until `token` is cancelled or an unrecoverable error occurs.
    async fn start(&self, token: CancellationToken) -> Result<(), CollectorError>;

    /// Wait for the running task to acknowledge cancellation.
    ///
    /// # Errors
    /// Returns `CollectorError::StopTimeout` if no acknowledgment arrives in time.
    async fn stop(&self) -> Result<(), CollectorError>;

    /// Release held resources.
    async fn destroy(&self) -> Result<(), CollectorError>;
}
