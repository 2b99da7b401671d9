//! Background task draining the event buffer.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::Event;
use crate::agent::EventSink;

/// Spawn the consumer task for one session.
///
/// The task hands every buffered event to `sink` until `token` is cancelled,
/// then drains whatever is already buffered and exits with the number of
/// events consumed.
pub(crate) fn spawn_consumer(
    session: Uuid,
    mut rx: mpsc::Receiver<Event>,
    sink: Arc<dyn EventSink>,
    token: CancellationToken,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        tracing::debug!(session = %session, "Event consumer started");
        let mut consumed: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    // After close, recv yields what is buffered or in flight, then None.
                    rx.close();
                    while let Some(event) = rx.recv().await {
                        sink.handle(event).await;
                        consumed += 1;
                    }
                    break;
                }
                event = rx.recv() => match event {
                    Some(event) => {
                        sink.handle(event).await;
                        consumed += 1;
                    }
                    None => break,
                },
            }
        }

        tracing::debug!(session = %session, consumed, "Event consumer stopped");
        consumed
    })
}
