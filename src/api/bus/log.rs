//! Logging event bus sink.

use async_trait::async_trait;
use tracing::info;

use super::{EventBus, EventBusError, EventEntry, PutEventsOutput};

/// Accepts every entry and logs it. Used when no bus endpoint is configured.
#[derive(Debug, Default, Clone)]
pub struct LogEventBus;

impl LogEventBus {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventBus for LogEventBus {
    async fn put_events(&self, entries: Vec<EventEntry>) -> Result<PutEventsOutput, EventBusError> {
        for entry in &entries {
            info!(
                source = %entry.source,
                detail_type = %entry.detail_type,
                event_bus_name = ?entry.event_bus_name,
                "[EVENT] {}",
                entry.detail
            );
        }
        Ok(PutEventsOutput::accepted(entries.len()))
    }
}
