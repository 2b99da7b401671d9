//! Agent supervising collector lifecycles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::Event;
use crate::agent::builder::{DEFAULT_JOIN_TIMEOUT, DEFAULT_START_GRACE, MAX_BUFFER_SIZE};
use crate::agent::consumer::spawn_consumer;
use crate::agent::{
    AgentError, AgentState, CollectorFailures, EventSender, EventSink, LoggingSink, Operation,
    Phase,
};
use crate::collector::{Collector, CollectorError, CollectorRegistry, EventReceiver};

/// A running collector task.
struct CollectorTask {
    name: String,
    /// Taken once the task's result has been collected.
    handle: Option<JoinHandle<Result<(), CollectorError>>>,
}

/// State owned by one Running session.
struct Session {
    id: Uuid,
    token: CancellationToken,
    consumer: JoinHandle<u64>,
    tasks: Vec<CollectorTask>,
}

/// Supervisor owning a registry of collectors, a bounded event buffer, and
/// the lifecycle state machine.
///
/// # Lifecycle
///
/// - [`register_collector`](Self::register_collector) and
///   [`destroy`](Self::destroy) require `Waiting`
/// - [`start`](Self::start) moves `Waiting` to `Running`
/// - [`stop`](Self::stop) moves `Running` back to `Waiting`
/// - `destroy` is terminal
///
/// Calls made in the wrong state fail with [`AgentError::State`] and have no
/// side effect. Per-collector failures during start, stop and destroy never
/// prevent the remaining collectors from being processed.
pub struct Agent {
    registry: CollectorRegistry,
    sender: EventSender,
    sink: Arc<dyn EventSink>,
    buffer_size: usize,
    start_grace: Duration,
    join_timeout: Duration,
    state: AgentState,
    session: Option<Session>,
}

impl Agent {
    /// Create an agent with the given event buffer capacity.
    ///
    /// Events are logged by a [`LoggingSink`]. Use
    /// [`AgentBuilder`](crate::AgentBuilder) for other sinks or timeouts.
    pub fn new(buffer_size: usize) -> Self {
        let buffer_size = if buffer_size == 0 {
            tracing::warn!("Buffer size must be at least 1. Using 1.");
            1
        } else if buffer_size > MAX_BUFFER_SIZE {
            tracing::warn!(buffer_size, max = MAX_BUFFER_SIZE, "Buffer size too large. Using max.");
            MAX_BUFFER_SIZE
        } else {
            buffer_size
        };

        Self::from_parts(
            buffer_size,
            Arc::new(LoggingSink),
            DEFAULT_START_GRACE,
            DEFAULT_JOIN_TIMEOUT,
        )
    }

    pub(crate) fn from_parts(
        buffer_size: usize,
        sink: Arc<dyn EventSink>,
        start_grace: Duration,
        join_timeout: Duration,
    ) -> Self {
        Self {
            registry: CollectorRegistry::new(),
            sender: EventSender::new(),
            sink,
            buffer_size,
            start_grace,
            join_timeout,
            state: AgentState::Waiting,
            session: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Event buffer capacity.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Registered collector names in registration order.
    pub fn collector_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Number of registered collectors.
    pub fn collector_count(&self) -> usize {
        self.registry.len()
    }

    /// Identifier of the running session, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Handle delivering events into this agent's buffer.
    pub fn receiver(&self) -> EventSender {
        self.sender.clone()
    }

    /// Register a collector under `name` and initialize it.
    ///
    /// # Errors
    /// - `AgentError::State` unless the agent is waiting
    /// - `AgentError::DuplicateName` if `name` is taken; `init` is not called
    /// - `AgentError::Init` carrying the collector's error if `init` fails;
    ///   the collector is not registered
    pub async fn register_collector(
        &mut self,
        name: impl Into<String>,
        collector: Arc<dyn Collector>,
    ) -> Result<(), AgentError> {
        let name = name.into();
        self.ensure_state(Operation::RegisterCollector)?;

        if self.registry.contains(&name) {
            return Err(AgentError::DuplicateName(name));
        }

        let receiver: Arc<dyn EventReceiver> = Arc::new(self.sender.clone());
        if let Err(source) = collector.init(receiver).await {
            tracing::error!(collector = %name, error = %source, "Collector init failed");
            return Err(AgentError::Init { name, source });
        }

        self.registry.insert(name.clone(), collector);
        tracing::info!(collector = %name, "Collector registered");
        Ok(())
    }

    /// Start a session: spawn the consumer and one task per collector.
    ///
    /// Returns once every task has been launched. Collectors whose `start`
    /// fails within the start grace period are reported in the aggregate;
    /// the agent stays running either way and must be stopped.
    pub async fn start(&mut self) -> Result<(), AgentError> {
        self.ensure_state(Operation::Start)?;

        let id = Uuid::new_v4();
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::channel(self.buffer_size);
        self.sender.attach(tx);
        self.state = AgentState::Running;

        let consumer = spawn_consumer(id, rx, Arc::clone(&self.sink), token.clone());
        let tasks: Vec<CollectorTask> = self
            .registry
            .iter()
            .map(|(name, collector)| {
                let collector = Arc::clone(collector);
                let token = token.clone();
                CollectorTask {
                    name: name.to_string(),
                    handle: Some(tokio::spawn(async move { collector.start(token).await })),
                }
            })
            .collect();

        tracing::info!(session = %id, collectors = tasks.len(), "Agent started");
        self.session = Some(Session {
            id,
            token,
            consumer,
            tasks,
        });

        self.collect_early_failures().await.into_result()
    }

    /// Stop the running session.
    ///
    /// Cancels the session token, calls `stop` on every collector, then joins
    /// every collector task (aborting those exceeding the join timeout) and
    /// the consumer. The aggregate holds stop failures and start failures
    /// not already reported by [`start`](Self::start).
    pub async fn stop(&mut self) -> Result<(), AgentError> {
        self.ensure_state(Operation::Stop)?;
        self.state = AgentState::Waiting;

        let Some(session) = self.session.take() else {
            return Ok(());
        };
        session.token.cancel();
        self.sender.detach();
        tracing::info!(session = %session.id, "Agent stopping");

        let mut failures = CollectorFailures::default();
        for (name, collector) in self.registry.iter() {
            if let Err(e) = collector.stop().await {
                failures.push(name, Phase::Stop, e);
            }
        }

        for task in session.tasks {
            join_collector_task(task, self.join_timeout, &mut failures).await;
        }

        match session.consumer.await {
            Ok(consumed) => {
                tracing::info!(session = %session.id, consumed, "Agent stopped");
            }
            Err(e) => {
                tracing::error!(session = %session.id, error = %e, "Event consumer failed");
            }
        }

        failures.into_result()
    }

    /// Destroy every collector. The agent becomes inert.
    pub async fn destroy(&mut self) -> Result<(), AgentError> {
        self.ensure_state(Operation::Destroy)?;

        let mut failures = CollectorFailures::default();
        for (name, collector) in self.registry.drain() {
            if let Err(e) = collector.destroy().await {
                failures.push(&name, Phase::Destroy, e);
            }
        }

        self.state = AgentState::Destroyed;
        tracing::info!(failed = failures.len(), "Agent destroyed");
        failures.into_result()
    }

    // --- Private helpers ---

    fn ensure_state(&self, operation: Operation) -> Result<(), AgentError> {
        if self.state == operation.required_state() {
            Ok(())
        } else {
            tracing::warn!(operation = %operation, state = %self.state, "Rejected operation");
            Err(AgentError::State {
                operation,
                state: self.state,
            })
        }
    }

    async fn collect_early_failures(&mut self) -> CollectorFailures {
        let mut failures = CollectorFailures::default();
        if !self.start_grace.is_zero() {
            tokio::time::sleep(self.start_grace).await;
        }

        let Some(session) = self.session.as_mut() else {
            return failures;
        };
        for task in &mut session.tasks {
            let Some(handle) = task.handle.take_if(|h| h.is_finished()) else {
                continue;
            };
            match handle.await {
                Ok(Ok(())) => {
                    tracing::debug!(collector = %task.name, "Collector finished early");
                }
                Ok(Err(e)) => failures.push(&task.name, Phase::Start, e),
                Err(e) => failures.push(&task.name, Phase::Start, join_error(e)),
            }
        }
        failures
    }
}

/// Join one collector task, aborting it if it outlives `timeout`.
async fn join_collector_task(
    task: CollectorTask,
    timeout: Duration,
    failures: &mut CollectorFailures,
) {
    let Some(mut handle) = task.handle else {
        return;
    };

    let joined = match tokio::time::timeout(timeout, &mut handle).await {
        Ok(joined) => joined,
        Err(_) => {
            tracing::warn!(collector = %task.name, "Collector task still running, aborting");
            handle.abort();
            match tokio::time::timeout(timeout, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::error!(collector = %task.name, "Collector task ignored abort, detaching");
                    return;
                }
            }
        }
    };

    match joined {
        Ok(Ok(())) => {}
        Ok(Err(e)) => failures.push(&task.name, Phase::Start, e),
        // The stop timeout was already reported for this collector.
        Err(e) if e.is_cancelled() => {
            tracing::warn!(collector = %task.name, "Collector task aborted");
        }
        Err(e) => failures.push(&task.name, Phase::Start, join_error(e)),
    }
}

fn join_error(e: JoinError) -> CollectorError {
    if e.is_cancelled() {
        CollectorError::Aborted
    } else {
        CollectorError::Panicked(e.to_string())
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("state", &self.state)
            .field("buffer_size", &self.buffer_size)
            .field("registry", &self.registry)
            .field("session", &self.session_id())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl EventReceiver for Agent {
    async fn on_event(&self, event: Event) -> Result<(), CollectorError> {
        self.sender.send(event).await
    }
}

impl Drop for Agent {
    fn drop(&mut self) {
        // Cancel a session that was never stopped so its tasks wind down.
        if let Some(session) = self.session.take() {
            session.token.cancel();
            self.sender.detach();
        }
    }
}
