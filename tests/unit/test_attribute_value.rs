//! Unit tests for attribute-typed value decoding.

use model_api::streams::attribute_value::{
    AttributeMap, AttributeValue, AttributeValueError, decode_map, encode_map,
};
use serde_json::{Map, Value, json};

fn attribute(raw: Value) -> AttributeValue {
    serde_json::from_value(raw).unwrap()
}

#[test]
fn test_scalar_tags_decode() {
    assert_eq!(attribute(json!({"S": "hello"})).to_json().unwrap(), json!("hello"));
    assert_eq!(attribute(json!({"N": "42"})).to_json().unwrap(), json!(42));
    assert_eq!(attribute(json!({"N": "-7"})).to_json().unwrap(), json!(-7));
    assert_eq!(attribute(json!({"N": "2.5"})).to_json().unwrap(), json!(2.5));
    assert_eq!(attribute(json!({"BOOL": true})).to_json().unwrap(), json!(true));
    assert_eq!(attribute(json!({"NULL": true})).to_json().unwrap(), Value::Null);
    assert_eq!(attribute(json!({"B": "aGk="})).to_json().unwrap(), json!("aGk="));
}

#[test]
fn test_nested_map_and_list_decode() {
    let value = attribute(json!({
        "M": {
            "owner": {"S": "finance"},
            "tags": {"L": [{"S": "a"}, {"N": "1"}]}
        }
    }));
    assert_eq!(
        value.to_json().unwrap(),
        json!({"owner": "finance", "tags": ["a", 1]})
    );
}

#[test]
fn test_set_tags_decode_to_arrays() {
    assert_eq!(
        attribute(json!({"SS": ["x", "y"]})).to_json().unwrap(),
        json!(["x", "y"])
    );
    assert_eq!(
        attribute(json!({"NS": ["1", "2.5"]})).to_json().unwrap(),
        json!([1, 2.5])
    );
}

#[test]
fn test_bad_number_is_an_error() {
    let err = attribute(json!({"N": "forty-two"})).to_json().unwrap_err();
    assert_eq!(err, AttributeValueError::InvalidNumber("forty-two".to_string()));
}

#[test]
fn test_unknown_tag_fails_to_parse() {
    let result: Result<AttributeValue, _> = serde_json::from_value(json!({"Q": "?"}));
    assert!(result.is_err());
}

#[test]
fn test_decode_map_of_model_image() {
    let image: AttributeMap = serde_json::from_value(json!({
        "guid": {"S": "84de05a3-9d68-41ae-b291-1405bc902389"},
        "name": {"S": "martha"}
    }))
    .unwrap();
    let decoded = decode_map(&image).unwrap();
    assert_eq!(decoded["guid"], json!("84de05a3-9d68-41ae-b291-1405bc902389"));
    assert_eq!(decoded["name"], json!("martha"));
}

#[test]
fn test_encode_then_decode_preserves_plain_json() {
    let mut item = Map::new();
    item.insert("guid".to_string(), json!("84de05a3-9d68-41ae-b291-1405bc902389"));
    item.insert("metadata".to_string(), json!({"n": 3, "ok": false, "none": null}));
    let encoded = encode_map(&item);
    assert_eq!(encoded["guid"].as_str(), Some("84de05a3-9d68-41ae-b291-1405bc902389"));
    assert_eq!(decode_map(&encoded).unwrap(), item);
}
