// McNotify - app/delivery.rs
//
// Delivery loop: drains the hand-off queue and pushes rendered notification
// text to a `NotificationSink`.
//
// Runs on a single-threaded tokio runtime. Waiting on an empty queue
// suspends the task; the tailer thread is never involved. Every dequeued
// event is sent exactly once: a failed send is logged, counted, and the
// event dropped (no retry, no re-queue). The loop ends when every producer
// has been dropped and the queue is empty.

use crate::core::model::PlayerEvent;
use crate::core::template::MessageTemplates;
use crate::util::error::DeliveryError;
use std::future::Future;
use tokio::sync::mpsc;

/// Destination for notification text (a chat channel, stdout, ...).
pub trait NotificationSink: Send {
    /// Resolve once the sink can accept messages. Called once before the
    /// loop starts; an error here is fatal to the process.
    fn ready(&mut self) -> impl Future<Output = Result<(), DeliveryError>> + Send;

    /// Deliver one message. Timeouts are the sink's own business.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Counters reported when the delivery loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Consumer side of the event pipeline.
pub struct DeliveryWorker<S> {
    sink: S,
    templates: MessageTemplates,
    stats: DeliveryStats,
}

impl<S: NotificationSink> DeliveryWorker<S> {
    pub fn new(sink: S, templates: MessageTemplates) -> Self {
        Self {
            sink,
            templates,
            stats: DeliveryStats::default(),
        }
    }

    /// Wait until the sink reports it can accept messages.
    pub async fn ready(&mut self) -> Result<(), DeliveryError> {
        self.sink.ready().await
    }

    /// Deliver queued events until the queue closes.
    pub async fn run(mut self, mut rx: mpsc::Receiver<PlayerEvent>) -> DeliveryStats {
        tracing::info!("Delivery loop started");

        while let Some(event) = rx.recv().await {
            self.deliver(&event).await;
        }

        tracing::info!(
            delivered = self.stats.delivered,
            failed = self.stats.failed,
            "Delivery loop finished"
        );
        self.stats
    }

    /// Render and send a single event. Returns whether the sink accepted it.
    pub async fn deliver(&mut self, event: &PlayerEvent) -> bool {
        let text = self.templates.render(event);

        match self.sink.send(&text).await {
            Ok(()) => {
                self.stats.delivered += 1;
                tracing::info!(kind = %event.kind(), player = event.player(), "Notification sent");
                true
            }
            Err(e) => {
                self.stats.failed += 1;
                tracing::warn!(
                    kind = %event.kind(),
                    player = event.player(),
                    error = %e,
                    "Notification delivery failed; dropping event"
                );
                false
            }
        }
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats
    }
}

// =============================================================================
// Stdout sink
// =============================================================================

/// Prints each notification to stdout with a UTC timestamp. Used for
/// `--dry-run` and local testing.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl NotificationSink for StdoutSink {
    async fn ready(&mut self) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn send(&mut self, text: &str) -> Result<(), DeliveryError> {
        println!("[{}] {text}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"));
        Ok(())
    }
}

// =============================================================================
// Unit tests
// =============================================================================
