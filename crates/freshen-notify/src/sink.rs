use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::report::ErrorReport;

/// External receiver of failure notifications.
///
/// This is the only channel through which failures reach the host
/// application. Implementations must not fail; nothing is read back.
pub trait NotificationSink: Send + Sync {
    fn send(&self, category: &str, message: &str, detail: Option<&str>);
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn send(&self, category: &str, message: &str, detail: Option<&str>) {
        (**self).send(category, message, detail);
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for Box<S> {
    fn send(&self, category: &str, message: &str, detail: Option<&str>) {
        (**self).send(category, message, detail);
    }
}

/// Emits every notification as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn send(&self, category: &str, message: &str, detail: Option<&str>) {
        tracing::warn!(category, detail = detail.unwrap_or_default(), "{message}");
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn send(&self, _category: &str, _message: &str, _detail: Option<&str>) {}
}

/// Keeps every notification in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<ErrorReport>>,
}

impl MemorySink {
    pub fn reports(&self) -> Vec<ErrorReport> {
        self.lock().clone()
    }

    /// Returns the recorded reports and clears the buffer.
    pub fn take(&self) -> Vec<ErrorReport> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn categories(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.category.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ErrorReport>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSink for MemorySink {
    fn send(&self, category: &str, message: &str, detail: Option<&str>) {
        let mut report = ErrorReport::new(category, message);
        report.detail = detail.map(str::to_owned);
        self.lock().push(report);
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> NotificationSink for FnSink<F>
where
    F: Fn(&str, &str, Option<&str>) + Send + Sync,
{
    fn send(&self, category: &str, message: &str, detail: Option<&str>) {
        (self.0)(category, message, detail);
    }
}

/// Cheaply clonable handle to the sink chosen at construction time.
///
/// The default notifier logs through [`TracingSink`].
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: impl NotificationSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn from_arc(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub fn silent() -> Self {
        Self::new(NullSink)
    }

    pub fn report(&self, report: &ErrorReport) {
        self.sink
            .send(&report.category, &report.message, report.detail.as_deref());
    }

    /// Shorthand for a report without detail.
    pub fn error(&self, category: &str, message: impl fmt::Display) {
        self.sink.send(category, &message.to_string(), None);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(TracingSink)
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").field("sink", &"{ ... }").finish()
    }
}
