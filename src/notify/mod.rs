//! Notification sinks. Fire-and-forget from the pipeline's point of view:
//! a sink failure is logged and counted, never surfaced as a classification
//! failure.

pub mod telegram;

use anyhow::Result;
use chrono::{DateTime, Utc};

/// One outbound message, already formatted by the report layer.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    /// HTML-formatted body.
    pub message: String,
    pub ts: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ts: Utc::now(),
        }
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, ev: &NotificationEvent) -> Result<()>;
    /// Sink name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Fan-out over every configured sink. Errors are swallowed per sink so one
/// broken channel cannot silence the others.
pub struct NotifierMux {
    sinks: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Sinks configured from the environment. Currently Telegram only.
    pub fn from_env() -> Self {
        let mut mux = Self::new();
        mux.push(Box::new(telegram::TelegramNotifier::from_env()));
        mux
    }

    pub fn push(&mut self, sink: Box<dyn Notifier>) {
        self.sinks.push(sink);
    }

    /// Deliver `ev` to every sink. Always returns; failures are logged and
    /// counted in `notify_errors_total`.
    pub async fn dispatch(&self, ev: &NotificationEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(ev).await {
                metrics::counter!("notify_errors_total").increment(1);
                tracing::warn!(sink = sink.name(), error = ?e, "notification delivery failed");
            }
        }
    }
}

impl Default for NotifierMux {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        sent: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Notifier for CountingSink {
        async fn send(&self, _ev: &NotificationEvent) -> Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("sink down");
            }
            Ok(())
        }
        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn dispatch_reaches_all_sinks_despite_failures() {
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));

        let mut mux = NotifierMux::new();
        mux.push(Box::new(CountingSink {
            sent: a.clone(),
            fail: true,
        }));
        mux.push(Box::new(CountingSink {
            sent: b.clone(),
            fail: false,
        }));

        mux.dispatch(&NotificationEvent::now("hola")).await;
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1, "second sink still reached");
    }
}
