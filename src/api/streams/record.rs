//! Change-stream records describing one mutation of a stored row.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::attribute_value::AttributeMap;

/// Raw mutation kind reported by the change stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Modify,
    Remove,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Modify => "MODIFY",
            ChangeKind::Remove => "REMOVE",
        }
    }

    /// Parse a raw `eventName`; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "INSERT" => Some(ChangeKind::Insert),
            "MODIFY" => Some(ChangeKind::Modify),
            "REMOVE" => Some(ChangeKind::Remove),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys and images of a change record, in attribute-typed JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamRecord {
    #[serde(default)]
    pub keys: AttributeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_view_type: Option<String>,
}

/// One change-stream record. `event_name` is kept raw so that unsupported
/// kinds can be reported rather than rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(rename = "eventName")]
    pub event_name: String,
    #[serde(rename = "eventSource", default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    pub dynamodb: StreamRecord,
}

impl ChangeRecord {
    pub fn new(kind: ChangeKind, record: StreamRecord) -> Self {
        Self {
            event_id: None,
            event_name: kind.as_str().to_string(),
            event_source: None,
            dynamodb: record,
        }
    }

    pub fn kind(&self) -> Option<ChangeKind> {
        ChangeKind::parse(&self.event_name)
    }

    /// Image before the mutation, absent for inserts.
    pub fn before_image(&self) -> Option<&AttributeMap> {
        self.dynamodb.old_image.as_ref()
    }

    /// Image after the mutation, absent for removals.
    pub fn after_image(&self) -> Option<&AttributeMap> {
        self.dynamodb.new_image.as_ref()
    }

    pub fn keys(&self) -> &AttributeMap {
        &self.dynamodb.keys
    }
}

/// A batch of change records as delivered by the stream processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<ChangeRecord>,
}

impl From<Vec<ChangeRecord>> for ChangeBatch {
    fn from(records: Vec<ChangeRecord>) -> Self {
        Self { records }
    }
}

/// A batch as received over the wire. Records stay undecoded until each is
/// processed, so one malformed record cannot reject its neighbours.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawChangeBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<Value>,
}
