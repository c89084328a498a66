use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Name of the attribute that keys every stored model.
pub const GUID_ATTRIBUTE: &str = "guid";

/// The API's single resource type.
///
/// `guid` is always a canonical lowercase UUID. A value that does not parse
/// as a UUID is replaced with a fresh v4 instead of being rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Model {
    #[serde(default = "generate_guid", deserialize_with = "deserialize_guid")]
    pub guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<HashMap<String, Value>>,
}

impl Model {
    /// Create a model with a generated guid.
    pub fn new(name: Option<String>, metadata: Option<HashMap<String, Value>>) -> Self {
        Self {
            guid: generate_guid(),
            name,
            metadata,
        }
    }

    /// Create a model for `guid`, substituting a fresh guid if it is not a UUID.
    pub fn with_guid(guid: &str) -> Self {
        Self {
            guid: normalize_guid(guid),
            name: None,
            metadata: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Store item for this model. Unset optional fields are left out.
    pub fn to_item(&self) -> Map<String, Value> {
        let mut item = Map::new();
        item.insert(GUID_ATTRIBUTE.to_string(), Value::String(self.guid.clone()));
        if let Some(name) = &self.name {
            item.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(metadata) = &self.metadata {
            let metadata: Map<String, Value> = metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            item.insert("metadata".to_string(), Value::Object(metadata));
        }
        item
    }

    /// Rebuild a model from a store item.
    pub fn from_item(item: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(item))
    }
}

/// Generate a new canonical v4 guid.
pub fn generate_guid() -> String {
    Uuid::new_v4().to_string()
}

/// Canonicalize `candidate` if it is a UUID, otherwise generate a new one.
pub fn normalize_guid(candidate: &str) -> String {
    match Uuid::parse_str(candidate.trim()) {
        Ok(uuid) => uuid.to_string(),
        Err(_) => generate_guid(),
    }
}

fn deserialize_guid<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    // Anything other than a UUID string (null, numbers, garbage) gets a new guid.
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => normalize_guid(&s),
        _ => generate_guid(),
    })
}
