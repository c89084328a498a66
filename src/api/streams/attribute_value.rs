//! Attribute-typed JSON, the store's native value encoding.
//!
//! Every value is a single-key object naming its type:
//! `{"S": "x"}`, `{"N": "1.5"}`, `{"BOOL": true}`, `{"NULL": true}`,
//! `{"M": {..}}`, `{"L": [..]}`, `{"SS": [..]}`, `{"NS": [..]}`,
//! `{"B": ".."}`, `{"BS": [..]}`.
//!
//! Decoding produces plain `serde_json::Value`s; binary values stay as their
//! base64 text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use thiserror::Error;

/// A map of attribute name to typed value, as found in keys and images.
pub type AttributeMap = HashMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    S(String),
    #[serde(rename = "N")]
    N(String),
    #[serde(rename = "B")]
    B(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "M")]
    M(AttributeMap),
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    #[serde(rename = "BS")]
    Bs(Vec<String>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeValueError {
    #[error("Invalid number attribute: {0}")]
    InvalidNumber(String),
}

impl AttributeValue {
    /// Decode into a plain JSON value.
    pub fn to_json(&self) -> Result<Value, AttributeValueError> {
        Ok(match self {
            AttributeValue::S(s) | AttributeValue::B(s) => Value::String(s.clone()),
            AttributeValue::N(n) => Value::Number(parse_number(n)?),
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::M(map) => Value::Object(decode_map(map)?),
            AttributeValue::L(items) => Value::Array(
                items
                    .iter()
                    .map(AttributeValue::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            AttributeValue::Ss(items) | AttributeValue::Bs(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            AttributeValue::Ns(items) => Value::Array(
                items
                    .iter()
                    .map(|n| parse_number(n).map(Value::Number))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Encode a plain JSON value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AttributeValue::Null(true),
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => AttributeValue::N(n.to_string()),
            Value::String(s) => AttributeValue::S(s.clone()),
            Value::Array(items) => {
                AttributeValue::L(items.iter().map(AttributeValue::from_json).collect())
            }
            Value::Object(map) => AttributeValue::M(encode_map(map)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }
}

/// Decode an attribute map into a JSON object.
pub fn decode_map(map: &AttributeMap) -> Result<Map<String, Value>, AttributeValueError> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), v.to_json()?)))
        .collect()
}

/// Encode a JSON object as an attribute map.
pub fn encode_map(map: &Map<String, Value>) -> AttributeMap {
    map.iter()
        .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
        .collect()
}

fn parse_number(raw: &str) -> Result<Number, AttributeValueError> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Number::from(i));
    }
    if let Ok(u) = raw.parse::<u64>() {
        return Ok(Number::from(u));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| AttributeValueError::InvalidNumber(raw.to_string()))
}
