//! In-memory event bus for tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{EventBus, EventBusError, EventEntry, PutEventsOutput};

type FailurePredicate = Arc<dyn Fn(&EventEntry) -> bool + Send + Sync>;

/// Records every published batch. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryEventBus {
    batches: Arc<Mutex<Vec<Vec<EventEntry>>>>,
    fail_when: Option<FailurePredicate>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any batch containing an entry matching `predicate`.
    pub fn fail_when(
        mut self,
        predicate: impl Fn(&EventEntry) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.fail_when = Some(Arc::new(predicate));
        self
    }

    /// Every accepted entry, in publish order.
    pub async fn entries(&self) -> Vec<EventEntry> {
        self.batches.lock().await.iter().flatten().cloned().collect()
    }

    /// Number of accepted `put_events` calls.
    pub async fn publish_count(&self) -> usize {
        self.batches.lock().await.len()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn put_events(&self, entries: Vec<EventEntry>) -> Result<PutEventsOutput, EventBusError> {
        if let Some(predicate) = &self.fail_when {
            if entries.iter().any(|e| predicate(e)) {
                return Err(EventBusError::Rejected {
                    code: "InternalFailure".to_string(),
                    message: "entry rejected by bus".to_string(),
                    status: 500,
                });
            }
        }

        let count = entries.len();
        self.batches.lock().await.push(entries);
        Ok(PutEventsOutput::accepted(count))
    }
}
