//! Dispatches batches of change records to the translator.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::change_event_translator::ChangeEventTranslator;
use crate::models::Response;
use crate::streams::{ChangeBatch, ChangeRecord, RawChangeBatch};

/// Default number of feed records gathered into one batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Runs every record of a batch through the translator.
///
/// Records are independent: one failure never stops the rest of the batch.
/// Nothing is retried here; redelivery is the stream processor's job.
#[derive(Clone)]
pub struct StreamDispatcher {
    translator: ChangeEventTranslator,
}

impl StreamDispatcher {
    pub fn new(translator: ChangeEventTranslator) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &ChangeEventTranslator {
        &self.translator
    }

    /// Process `batch` in order and return the aggregate response.
    pub async fn dispatch(&self, batch: &ChangeBatch) -> Response {
        self.dispatch_records(&batch.records).await
    }

    pub async fn dispatch_records(&self, records: &[ChangeRecord]) -> Response {
        let mut response = Response::new();
        for record in records {
            self.translator.process(record, &mut response).await;
        }
        log_failures(&response, records.len());
        response
    }

    /// Process a batch whose records are still raw JSON.
    ///
    /// A record that does not decode is reported like an untranslatable one.
    pub async fn dispatch_raw(&self, batch: &RawChangeBatch) -> Response {
        self.dispatch_values(&batch.records).await
    }

    pub async fn dispatch_values(&self, records: &[Value]) -> Response {
        let mut response = Response::new();
        for value in records {
            self.translator.process_value(value, &mut response).await;
        }
        log_failures(&response, records.len());
        response
    }

    /// Consume a change feed until it closes.
    ///
    /// Waits for one record, then takes whatever else is already queued, up
    /// to `batch_size`, and dispatches that as one batch.
    pub async fn run(self, mut feed: mpsc::UnboundedReceiver<ChangeRecord>, batch_size: usize) {
        let batch_size = batch_size.max(1);
        info!("Change feed dispatcher started (batch size {})", batch_size);

        while let Some(first) = feed.recv().await {
            let mut batch = vec![first];
            while batch.len() < batch_size {
                match feed.try_recv() {
                    Ok(record) => batch.push(record),
                    Err(_) => break,
                }
            }
            self.dispatch_records(&batch).await;
        }

        info!("Change feed closed, dispatcher stopping");
    }
}

fn log_failures(response: &Response, total: usize) {
    if !response.is_success() {
        warn!("{} of {} change records failed", response.errors().len(), total);
    }
}
