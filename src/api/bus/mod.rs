//! Event bus sinks for publishing model change events.
//!
//! Implementations:
//! - `HttpEventBus` - posts batches to a configured HTTP endpoint
//! - `LogEventBus` - logs each entry, for local development
//! - `InMemoryEventBus` - records entries, for tests

pub mod error;
pub mod http;
pub mod log;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use error::EventBusError;
pub use http::HttpEventBus;
pub use log::LogEventBus;
pub use memory::InMemoryEventBus;

/// One entry of a batch publish. `detail` is a JSON-encoded string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventEntry {
    pub source: String,
    pub detail_type: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_bus_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

/// Batch publish request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsRequest {
    pub entries: Vec<EventEntry>,
}

/// Per-entry outcome reported by the bus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsResultEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Result of a batch publish.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsOutput {
    #[serde(default)]
    pub failed_entry_count: usize,
    #[serde(default)]
    pub entries: Vec<PutEventsResultEntry>,
}

impl PutEventsOutput {
    /// All entries accepted, with generated ids.
    pub fn accepted(count: usize) -> Self {
        Self {
            failed_entry_count: 0,
            entries: (0..count)
                .map(|_| PutEventsResultEntry {
                    event_id: Some(uuid::Uuid::new_v4().to_string()),
                    ..Default::default()
                })
                .collect(),
        }
    }

    /// Turn partially failed batches into an error naming the first failure.
    pub fn into_result(self) -> Result<Self, EventBusError> {
        if self.failed_entry_count == 0 {
            return Ok(self);
        }
        let first = self
            .entries
            .iter()
            .find(|e| e.error_code.is_some())
            .cloned()
            .unwrap_or_default();
        Err(EventBusError::FailedEntries {
            failed: self.failed_entry_count,
            code: first.error_code.unwrap_or_else(|| "InternalFailure".to_string()),
            message: first.error_message.unwrap_or_default(),
        })
    }
}

/// Trait for publishing batches of entries to an event bus.
#[async_trait::async_trait]
pub trait EventBus: Send + Sync {
    /// Publish `entries` as one batch.
    async fn put_events(&self, entries: Vec<EventEntry>) -> Result<PutEventsOutput, EventBusError>;
}
