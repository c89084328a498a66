//! Domain change events emitted when stored models change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::model::Model;
use crate::bus::EventEntry;

/// Default `source` stamped on every change event.
pub const DEFAULT_EVENT_SOURCE: &str = "model-api";

/// Kind of change applied to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Create,
    Update,
    Delete,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Create => "CREATE",
            EventType::Update => "UPDATE",
            EventType::Delete => "DELETE",
        }
    }

    /// `model.change.<type>` as published on the bus.
    pub fn detail_type(&self) -> String {
        format!("model.change.{}", self.as_str().to_lowercase())
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a change event. Missing images serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEventDetail {
    pub model_id: String,
    pub event_type: EventType,
    pub old_model: Option<Model>,
    pub new_model: Option<Model>,
}

/// Outbound event envelope, built once per change record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelChangeEvent {
    pub source: String,
    pub detail_type: String,
    pub detail: ModelEventDetail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_bus_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    pub time: DateTime<Utc>,
}

impl ModelChangeEvent {
    pub fn new(source: impl Into<String>, detail: ModelEventDetail) -> Self {
        Self {
            source: source.into(),
            detail_type: detail.event_type.detail_type(),
            detail,
            event_bus_name: None,
            resources: Vec::new(),
            time: Utc::now(),
        }
    }

    pub fn with_event_bus_name(mut self, name: Option<String>) -> Self {
        self.event_bus_name = name;
        self
    }

    pub fn with_resources(mut self, resources: Vec<String>) -> Self {
        self.resources = resources;
        self
    }

    /// The detail encoded as a JSON string, the form the transport carries.
    pub fn detail_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.detail)
    }

    /// Transport shape of the event with `detail` pre-stringified.
    pub fn dump(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.insert("detail".to_string(), Value::String(self.detail_string()?));
        }
        Ok(value)
    }

    /// Event-bus batch entry for this event.
    pub fn to_entry(&self) -> Result<EventEntry, serde_json::Error> {
        Ok(EventEntry {
            source: self.source.clone(),
            detail_type: self.detail_type.clone(),
            detail: self.detail_string()?,
            event_bus_name: self.event_bus_name.clone(),
            resources: self.resources.clone(),
            time: Some(self.time),
        })
    }
}
