//! Cloneable event receiver handle given to collectors.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;

use crate::Event;
use crate::collector::{CollectorError, EventReceiver};

/// Handle through which collectors deliver events into the agent's buffer.
///
/// The handle outlives sessions: the agent attaches a fresh bounded channel on
/// every start and detaches it on stop. Sending while detached fails with
/// `CollectorError::ReceiverClosed`.
#[derive(Clone, Default)]
pub struct EventSender {
    slot: Arc<RwLock<Option<mpsc::Sender<Event>>>>,
}

impl EventSender {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach(&self, tx: mpsc::Sender<Event>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(tx);
    }

    pub(crate) fn detach(&self) {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Whether a session buffer is currently attached.
    pub fn is_attached(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Enqueue an event, waiting while the buffer is full.
    pub async fn send(&self, event: Event) -> Result<(), CollectorError> {
        let tx = self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CollectorError::ReceiverClosed)?;

        tx.send(event)
            .await
            .map_err(|_| CollectorError::ReceiverClosed)
    }
}

impl std::fmt::Debug for EventSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSender")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[async_trait::async_trait]
impl EventReceiver for EventSender {
    async fn on_event(&self, event: Event) -> Result<(), CollectorError> {
        self.send(event).await
    }
}
