//! Upload telemetry events and the sinks that receive them.
//!
//! Every meaningful pipeline step produces an [`UploadEvent`]. Where events go
//! is up to the host: [`TracingSink`] logs them, [`MemorySink`] keeps a bounded
//! history for a monitoring panel, [`FanoutSink`] does both.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Default number of events a [`MemorySink`] retains.
pub const DEFAULT_EVENT_CAPACITY: usize = 50;

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Upload,
    Validation,
    Error,
    Success,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// One telemetry event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadEvent {
    /// Process-unique, increasing identifier
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub message: String,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub severity: Severity,
}

/// Receiver of upload events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: UploadEvent);
}

/// Stamps events with an id and the clock's time, then hands them to a sink.
#[derive(Clone)]
pub struct EventLog {
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
}

impl EventLog {
    pub fn new(sink: Arc<dyn EventSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    pub fn emit(
        &self,
        kind: EventKind,
        severity: Severity,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) {
        self.sink.record(UploadEvent {
            id: NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            message: message.into(),
            timestamp_ms: self.clock.now().timestamp_millis(),
            details,
            severity,
        });
    }
}

/// Forwards events to `tracing`, with the level derived from severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: UploadEvent) {
        let details = event
            .details
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default();

        match event.severity {
            Severity::Low => tracing::info!(
                id = event.id,
                kind = ?event.kind,
                details = %details,
                "{}",
                event.message
            ),
            Severity::Medium => tracing::warn!(
                id = event.id,
                kind = ?event.kind,
                details = %details,
                "{}",
                event.message
            ),
            Severity::High | Severity::Critical => tracing::error!(
                id = event.id,
                kind = ?event.kind,
                severity = ?event.severity,
                details = %details,
                "{}",
                event.message
            ),
        }
    }
}

/// Per-kind event totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    pub upload: usize,
    pub validation: usize,
    pub error: usize,
    pub success: usize,
    pub warning: usize,
}

/// Bounded in-memory history, oldest events dropped first.
pub struct MemorySink {
    capacity: usize,
    events: Mutex<VecDeque<UploadEvent>>,
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<UploadEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All retained events, newest first.
    pub fn snapshot(&self) -> Vec<UploadEvent> {
        self.lock().iter().rev().cloned().collect()
    }

    /// Up to `limit` retained events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<UploadEvent> {
        self.lock().iter().rev().take(limit).cloned().collect()
    }

    pub fn counts(&self) -> EventCounts {
        let mut counts = EventCounts::default();
        for event in self.lock().iter() {
            match event.kind {
                EventKind::Upload => counts.upload += 1,
                EventKind::Validation => counts.validation += 1,
                EventKind::Error => counts.error += 1,
                EventKind::Success => counts.success += 1,
                EventKind::Warning => counts.warning += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: UploadEvent) {
        let mut events = self.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sends each event to every inner sink.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink {
    fn record(&self, event: UploadEvent) {
        for sink in &self.sinks {
            sink.record(event.clone());
        }
    }
}
