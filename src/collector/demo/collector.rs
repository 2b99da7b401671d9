//! Demo collector.
//!
//! Emits one event per interval and acknowledges cancellation over a channel,
//! which `stop` waits on with a timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::Event;
use crate::collector::{Collector, CollectorError, DEFAULT_STOP_TIMEOUT, EventReceiver};

/// Default delay between two emissions (50 milliseconds).
const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

fn default_enabled() -> bool {
    true
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_stop_timeout() -> Duration {
    DEFAULT_STOP_TIMEOUT
}

/// Configuration for a demo collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Unique collector name, also used as the event name.
    pub name: String,
    /// Event payload.
    pub content: String,
    /// Enable this collector (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Delay between emissions (default: 50ms).
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
    /// How long `stop` waits for acknowledgment (default: 2s).
    #[serde(default = "default_stop_timeout", with = "humantime_serde")]
    pub stop_timeout: Duration,
    /// Stop emitting after this many events per run and idle until cancelled.
    #[serde(default)]
    pub max_events: Option<u64>,
}

impl DemoConfig {
    /// Create a new demo configuration with defaults.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            enabled: true,
            interval: DEFAULT_INTERVAL,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            max_events: None,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), CollectorError> {
        if self.name.is_empty() {
            return Err(CollectorError::Config("name cannot be empty".to_string()));
        }
        if self.interval.is_zero() {
            return Err(CollectorError::Config("interval must be positive".to_string()));
        }
        if self.stop_timeout.is_zero() {
            return Err(CollectorError::Config(
                "stop_timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the emission interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the stop acknowledgment timeout.
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Limit the number of emitted events.
    pub fn with_max_events(mut self, max: u64) -> Self {
        self.max_events = Some(max);
        self
    }

    /// Set enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Collector emitting `Event(name, content)` every interval until cancelled.
pub struct DemoCollector {
    config: DemoConfig,
    receiver: Mutex<Option<Arc<dyn EventReceiver>>>,
    ack_tx: mpsc::Sender<()>,
    ack_rx: tokio::sync::Mutex<mpsc::Receiver<()>>,
    emitted: AtomicU64,
}

impl DemoCollector {
    /// Create a new demo collector.
    pub fn new(config: DemoConfig) -> Self {
        let (ack_tx, ack_rx) = mpsc::channel(1);
        Self {
            config,
            receiver: Mutex::new(None),
            ack_tx,
            ack_rx: tokio::sync::Mutex::new(ack_rx),
            emitted: AtomicU64::new(0),
        }
    }

    /// Collector name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Collector configuration.
    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Number of events successfully delivered so far.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Acquire)
    }

    fn receiver(&self) -> Option<Arc<dyn EventReceiver>> {
        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop an acknowledgment left over from a previous run.
    fn clear_stale_ack(&self) {
        if let Ok(mut rx) = self.ack_rx.try_lock() {
            while rx.try_recv().is_ok() {}
        }
    }

    async fn run(
        &self,
        receiver: &Arc<dyn EventReceiver>,
        token: &CancellationToken,
    ) -> Result<(), CollectorError> {
        let mut sent: u64 = 0;
        loop {
            if token.is_cancelled() {
                tracing::debug!(collector = %self.config.name, "Cancellation observed");
                return Ok(());
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => continue,
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            if let Some(max) = self.config.max_events
                && sent >= max
            {
                token.cancelled().await;
                continue;
            }

            let event = Event::new(&self.config.name, &self.config.content);
            tokio::select! {
                biased;
                _ = token.cancelled() => continue,
                result = receiver.on_event(event) => match result {
                    Ok(()) => {
                        sent += 1;
                        let count = self.emitted.fetch_add(1, Ordering::AcqRel) + 1;
                        tracing::debug!(collector = %self.config.name, count, "Event emitted");
                    }
                    Err(_) if token.is_cancelled() => continue,
                    Err(e) => return Err(e),
                },
            }
        }
    }
}

impl std::fmt::Debug for DemoCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoCollector")
            .field("config", &self.config)
            .field("emitted", &self.emitted())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Collector for DemoCollector {
    async fn init(&self, receiver: Arc<dyn EventReceiver>) -> Result<(), CollectorError> {
        self.config.validate()?;

        let mut slot = self.receiver.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(CollectorError::AlreadyInitialized);
        }
        *slot = Some(receiver);

        tracing::info!(collector = %self.config.name, "Demo collector initialized");
        Ok(())
    }

    async fn start(&self, token: CancellationToken) -> Result<(), CollectorError> {
        self.clear_stale_ack();

        let result = match self.receiver() {
            Some(receiver) => {
                tracing::info!(
                    collector = %self.config.name,
                    interval = ?self.config.interval,
                    "Demo collector started"
                );
                self.run(&receiver, &token).await
            }
            None => Err(CollectorError::NotInitialized),
        };

        // Acknowledge on every exit path. Capacity is one; a pending ack
        // already covers this run.
        let _ = self.ack_tx.try_send(());
        result
    }

    async fn stop(&self) -> Result<(), CollectorError> {
        let timeout = self.config.stop_timeout;
        let mut rx = self.ack_rx.lock().await;

        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(_) => {
                tracing::info!(collector = %self.config.name, "Demo collector stopped");
                Ok(())
            }
            Err(_) => {
                tracing::warn!(
                    collector = %self.config.name,
                    timeout_ms = timeout.as_millis(),
                    "Demo collector stop timed out"
                );
                Err(CollectorError::StopTimeout(timeout))
            }
        }
    }

    async fn destroy(&self) -> Result<(), CollectorError> {
        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.clear_stale_ack();
        tracing::info!(collector = %self.config.name, "Demo collector destroyed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Receiver recording every event it is handed.
    #[derive(Default)]
    struct RecordingReceiver {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingReceiver {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl EventReceiver for RecordingReceiver {
        async fn on_event(&self, event: Event) -> Result<(), CollectorError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    /// Receiver that is always closed.
    struct ClosedReceiver;

    #[async_trait::async_trait]
    impl EventReceiver for ClosedReceiver {
        async fn on_event(&self, _event: Event) -> Result<(), CollectorError> {
            Err(CollectorError::ReceiverClosed)
        }
    }

    fn fast_config(name: &str) -> DemoConfig {
        DemoConfig::new(name, "content").with_interval(Duration::from_millis(5))
    }

    #[test]
    fn test_demo_config_defaults() {
        let config = DemoConfig::new("lion", "likes meat");
        assert!(config.enabled);
        assert_eq!(config.interval, DEFAULT_INTERVAL);
        assert_eq!(config.stop_timeout, DEFAULT_STOP_TIMEOUT);
        assert!(config.max_events.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_demo_config_validate() {
        assert!(DemoConfig::new("", "x").validate().is_err());
        assert!(
            DemoConfig::new("a", "x")
                .with_interval(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            DemoConfig::new("a", "x")
                .with_stop_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_demo_config_serde_defaults() {
        let yaml = r#"
name: rabbit
content: likes carrots
"#;
        let config: DemoConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.enabled);
        assert_eq!(config.interval, Duration::from_millis(50));
        assert_eq!(config.stop_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_init_twice_fails() {
        let collector = DemoCollector::new(fast_config("a"));
        let receiver = Arc::new(RecordingReceiver::default());
        collector.init(receiver.clone()).await.unwrap();
        let err = collector.init(receiver).await.unwrap_err();
        assert!(matches!(err, CollectorError::AlreadyInitialized));
    }

    #[tokio::test]
    async fn test_start_before_init_fails() {
        let collector = DemoCollector::new(fast_config("a"));
        let err = collector.start(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CollectorError::NotInitialized));
    }

    #[tokio::test]
    async fn test_start_emits_until_cancelled_and_stop_acknowledges() {
        let collector = Arc::new(DemoCollector::new(fast_config("lion")));
        let receiver = Arc::new(RecordingReceiver::default());
        collector.init(receiver.clone()).await.unwrap();

        let token = CancellationToken::new();
        let task = {
            let collector = Arc::clone(&collector);
            let token = token.clone();
            tokio::spawn(async move { collector.start(token).await })
        };

        tokio::time::sleep(Duration::from_millis(60)).await;
        token.cancel();

        collector.stop().await.unwrap();
        task.await.unwrap().unwrap();

        let events = receiver.events();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.name() == "lion"));
        assert_eq!(events.len() as u64, collector.emitted());
    }

    #[tokio::test]
    async fn test_max_events_caps_emission() {
        let collector = Arc::new(DemoCollector::new(fast_config("capped").with_max_events(3)));
        let receiver = Arc::new(RecordingReceiver::default());
        collector.init(receiver.clone()).await.unwrap();

        let token = CancellationToken::new();
        let task = {
            let collector = Arc::clone(&collector);
            let token = token.clone();
            tokio::spawn(async move { collector.start(token).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
        collector.stop().await.unwrap();
        task.await.unwrap().unwrap();

        assert_eq!(receiver.events().len(), 3);
    }

    #[tokio::test]
    async fn test_max_events_applies_per_run() {
        let collector = Arc::new(DemoCollector::new(fast_config("capped").with_max_events(3)));
        let receiver = Arc::new(RecordingReceiver::default());
        collector.init(receiver.clone()).await.unwrap();

        for run in 1..=2 {
            let token = CancellationToken::new();
            let task = {
                let collector = Arc::clone(&collector);
                let token = token.clone();
                tokio::spawn(async move { collector.start(token).await })
            };

            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
            collector.stop().await.unwrap();
            task.await.unwrap().unwrap();

            assert_eq!(receiver.events().len(), 3 * run);
        }
        assert_eq!(collector.emitted(), 6);
    }

    #[tokio::test]
    async fn test_stop_times_out_without_running_task() {
        let collector = DemoCollector::new(
            fast_config("idle").with_stop_timeout(Duration::from_millis(50)),
        );
        let err = collector.stop().await.unwrap_err();
        assert!(matches!(err, CollectorError::StopTimeout(d) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_closed_receiver_is_an_error_while_running() {
        let collector = DemoCollector::new(fast_config("orphan"));
        collector.init(Arc::new(ClosedReceiver)).await.unwrap();

        let err = collector.start(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CollectorError::ReceiverClosed));
        // The failed run still acknowledges.
        collector.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent_and_allows_rewiring() {
        let collector = DemoCollector::new(fast_config("a"));
        collector
            .init(Arc::new(RecordingReceiver::default()))
            .await
            .unwrap();
        collector.destroy().await.unwrap();
        collector.destroy().await.unwrap();

        let err = collector.start(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CollectorError::NotInitialized));
        collector
            .init(Arc::new(RecordingReceiver::default()))
            .await
            .unwrap();
    }
}
