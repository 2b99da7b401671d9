//! Processing step applied by the consumer task to every buffered event.

use std::sync::{Mutex, PoisonError};

use crate::Event;

/// Application-defined handler for events drained from the agent's buffer.
///
/// Called from the single consumer task, one event at a time, in buffer order.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Handle one event.
    async fn handle(&self, event: Event);
}

/// Sink that logs every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSink;

#[async_trait::async_trait]
impl EventSink for LoggingSink {
    async fn handle(&self, event: Event) {
        tracing::info!(name = %event.name(), content = %event.content(), "Event received");
    }
}

/// Sink accumulating events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events received so far, in arrival order.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events received from collector `name`, in arrival order.
    pub fn events_from(&self, name: &str) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.name() == name)
            .cloned()
            .collect()
    }

    /// Number of events received.
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no event was received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl EventSink for MemorySink {
    async fn handle(&self, event: Event) {
        tracing::debug!(name = %event.name(), "Event stored");
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_filters_by_name() {
        let sink = MemorySink::new();
        sink.handle(Event::new("a", "1")).await;
        sink.handle(Event::new("b", "2")).await;
        sink.handle(Event::new("a", "3")).await;

        assert_eq!(sink.len(), 3);
        let from_a: Vec<_> = sink
            .events_from("a")
            .into_iter()
            .map(|e| e.content().to_string())
            .collect();
        assert_eq!(from_a, vec!["1", "3"]);
    }
}
