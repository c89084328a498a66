//! Translation of change-stream records into model change events.
//!
//! Each record becomes exactly one [`ModelChangeEvent`], published as a
//! single-entry batch. A record that cannot be translated is never published.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::bus::{EventBus, EventBusError};
use crate::models::events::DEFAULT_EVENT_SOURCE;
use crate::models::model::GUID_ATTRIBUTE;
use crate::models::{EventType, Model, ModelChangeEvent, ModelError, ModelEventDetail, Response};
use crate::streams::attribute_value::{AttributeMap, AttributeValueError, decode_map};
use crate::streams::{ChangeKind, ChangeRecord};

/// Title of the error recorded for records that yield no event.
pub const EMPTY_EVENT_TITLE: &str = "empty model change event";

/// Reasons a change record cannot be turned into an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Malformed change record: {0}")]
    MalformedRecord(String),
    #[error("Unsupported change type: {0}")]
    UnsupportedChangeType(String),
    #[error("Change record has no string 'guid' key")]
    MissingKey,
    #[error("Failed to decode {image} image: {reason}")]
    InvalidImage { image: &'static str, reason: String },
    #[error(transparent)]
    AttributeValue(#[from] AttributeValueError),
}

impl TranslationError {
    /// Model error recorded for an untranslatable record.
    pub fn to_model_error(&self) -> ModelError {
        ModelError::new(500, EMPTY_EVENT_TITLE, self.to_string())
    }
}

/// Map a raw change kind to the domain event type.
pub fn event_type_for(kind: ChangeKind) -> EventType {
    match kind {
        ChangeKind::Insert => EventType::Create,
        ChangeKind::Modify => EventType::Update,
        ChangeKind::Remove => EventType::Delete,
    }
}

/// Translates change records and publishes the resulting events.
#[derive(Clone)]
pub struct ChangeEventTranslator {
    bus: Arc<dyn EventBus>,
    source: String,
    event_bus_name: Option<String>,
}

impl ChangeEventTranslator {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self {
            bus,
            source: DEFAULT_EVENT_SOURCE.to_string(),
            event_bus_name: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_event_bus_name(mut self, name: Option<String>) -> Self {
        self.event_bus_name = name;
        self
    }

    /// Build the event for `record` without publishing it.
    pub fn translate(&self, record: &ChangeRecord) -> Result<ModelChangeEvent, TranslationError> {
        let kind = record
            .kind()
            .ok_or_else(|| TranslationError::UnsupportedChangeType(record.event_name.clone()))?;
        let event_type = event_type_for(kind);

        let old_model = record
            .before_image()
            .map(|image| decode_image(image, "before"))
            .transpose()?;
        let new_model = record
            .after_image()
            .map(|image| decode_image(image, "after"))
            .transpose()?;

        // The id comes from the record keys, never from the images.
        let keys = decode_map(record.keys())?;
        let model_id = keys
            .get(GUID_ATTRIBUTE)
            .and_then(|v| v.as_str())
            .ok_or(TranslationError::MissingKey)?
            .to_string();

        let detail = ModelEventDetail {
            model_id,
            event_type,
            old_model,
            new_model,
        };

        let mut event = ModelChangeEvent::new(self.source.clone(), detail)
            .with_event_bus_name(self.event_bus_name.clone());
        if let Some(source) = &record.event_source {
            event = event.with_resources(vec![source.clone()]);
        }
        Ok(event)
    }

    /// Publish `event` as a single-entry batch.
    pub async fn publish(&self, event: &ModelChangeEvent) -> Result<(), EventBusError> {
        let entry = event
            .to_entry()
            .map_err(|e| EventBusError::Serialization(e.to_string()))?;
        self.bus.put_events(vec![entry]).await?.into_result()?;
        Ok(())
    }

    /// Decode a raw record, then translate and publish it.
    pub async fn process_value(&self, value: &Value, response: &mut Response) {
        match serde_json::from_value::<ChangeRecord>(value.clone()) {
            Ok(record) => self.process(&record, response).await,
            Err(e) => {
                let err = TranslationError::MalformedRecord(e.to_string());
                error!("Failed to decode change record: {}", err);
                response.add_model_error(err.to_model_error());
            }
        }
    }

    /// Translate and publish `record`, recording any failure on `response`.
    pub async fn process(&self, record: &ChangeRecord, response: &mut Response) {
        let event = match self.translate(record) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to translate {} record: {}", record.event_name, e);
                response.add_model_error(e.to_model_error());
                return;
            }
        };

        match self.publish(&event).await {
            Ok(()) => debug!(
                "Published {} for {}",
                event.detail_type, event.detail.model_id
            ),
            Err(e) => {
                error!(
                    "Failed to publish {} for {}: {}",
                    event.detail_type, event.detail.model_id, e
                );
                response.add_service_error(&e);
            }
        }
    }
}

fn decode_image(image: &AttributeMap, which: &'static str) -> Result<Model, TranslationError> {
    let item = decode_map(image)?;
    Model::from_item(item).map_err(|e| TranslationError::InvalidImage {
        image: which,
        reason: e.to_string(),
    })
}
