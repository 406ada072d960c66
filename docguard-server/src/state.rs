//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use docguard_core::{
    Clock, EventSink, FanoutSink, MemorySink, SystemClock, TracingSink, UploadGuard, UploadPolicy,
};

use crate::config::Config;
use crate::zones::ZoneRegistry;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Policy applied to every zone
    pub policy: UploadPolicy,
    /// Upload zones and their accepted files
    pub zones: Arc<ZoneRegistry>,
    /// Recent pipeline events served by `/events`
    pub events: Arc<MemorySink>,
    /// Sink the pipeline writes to (tracing plus the memory buffer)
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let events = Arc::new(MemorySink::new(config.event_buffer_size));
        let sink = FanoutSink::default()
            .with(Arc::new(TracingSink))
            .with(events.clone());

        Self {
            policy: config.upload_policy(),
            zones: Arc::new(ZoneRegistry::new()),
            events,
            sink: Arc::new(sink),
            clock,
        }
    }

    /// Pipeline for one request, optionally forcing a base name.
    pub fn guard(&self, custom_name: Option<&str>) -> UploadGuard {
        let policy = match custom_name {
            Some(name) => self.policy.clone().with_custom_base_name(name),
            None => self.policy.clone(),
        };
        UploadGuard::with_parts(policy, self.clock.clone(), self.sink.clone())
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
