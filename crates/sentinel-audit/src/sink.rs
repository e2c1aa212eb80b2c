// sink.rs — Where audit events go.
//
// Recording is one-way: `record` cannot fail from the caller's point of
// view, so a broken sink never changes a verdict. Sinks must be safe for
// concurrent appends because one engine may review many plans at once.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::AuditError;
use crate::event::{AuditEvent, EventKind};
use crate::log::AuditLog;

/// A destination for audit events.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

impl<S: AuditSink + ?Sized> AuditSink for Arc<S> {
    fn record(&self, event: AuditEvent) {
        (**self).record(event)
    }
}

/// Emits each event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, event: AuditEvent) {
        match event.kind {
            EventKind::Block => tracing::warn!(
                target: "sentinel::audit",
                kind = %event.kind,
                subject = ?event.subject,
                plan_id = event.plan_id.as_deref().unwrap_or("-"),
                agent = %event.agent,
                role = event.role.as_deref().unwrap_or("-"),
                layer = event.layer.as_deref().unwrap_or("-"),
                reason = event.reason.as_deref().unwrap_or(""),
                "blocked"
            ),
            EventKind::Intercept | EventKind::Approve => tracing::info!(
                target: "sentinel::audit",
                kind = %event.kind,
                subject = ?event.subject,
                plan_id = event.plan_id.as_deref().unwrap_or("-"),
                agent = %event.agent,
                role = event.role.as_deref().unwrap_or("-"),
                "{}",
                event.kind
            ),
        }
    }
}

/// Keeps events in memory. Useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        lock(&self.events).clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        lock(&self.events).iter().map(|e| e.kind).collect()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

impl AuditSink for MemorySink {
    fn record(&self, event: AuditEvent) {
        lock(&self.events).push(event);
    }
}

/// Appends events to a hash-chained JSONL [`AuditLog`].
///
/// Appends from this sink are serialized; other sinks or processes may
/// write the same file between them. Write failures are logged and
/// otherwise ignored.
pub struct JsonlSink {
    log: Mutex<AuditLog>,
}

impl JsonlSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        Ok(Self {
            log: Mutex::new(AuditLog::open(path)?),
        })
    }
}

impl AuditSink for JsonlSink {
    fn record(&self, mut event: AuditEvent) {
        let mut log = lock(&self.log);
        if let Err(e) = log.append(&mut event) {
            tracing::warn!(
                path = %log.path().display(),
                error = %e,
                "failed to append audit event"
            );
        }
    }
}

/// Sends every event to each inner sink in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AuditSink for FanoutSink {
    fn record(&self, event: AuditEvent) {
        for sink in &self.sinks {
            sink.record(event.clone());
        }
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
