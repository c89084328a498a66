//! Unit tests for the Model type and its guid handling.

use model_api::models::model::{Model, generate_guid, normalize_guid};
use proptest::prelude::*;
use serde_json::{Value, json};
use std::collections::HashMap;
use uuid::Uuid;

#[test]
fn test_generated_guid_is_v4() {
    let guid = generate_guid();
    let parsed = Uuid::parse_str(&guid).unwrap();
    assert_eq!(parsed.get_version_num(), 4);
    assert_eq!(parsed.to_string(), guid);
}

#[test]
fn test_non_uuid_candidate_is_replaced() {
    let guid = normalize_guid("definitely-not-a-guid");
    assert_ne!(guid, "definitely-not-a-guid");
    assert!(Uuid::parse_str(&guid).is_ok());
}

#[test]
fn test_any_uuid_version_is_accepted() {
    // v1 style uuid
    let v1 = "c232ab00-9414-11ec-b3c8-9f6bdeced846";
    assert_eq!(normalize_guid(v1), v1);
}

#[test]
fn test_alternate_uuid_forms_are_canonicalized() {
    let canonical = "84de05a3-9d68-41ae-b291-1405bc902389";
    assert_eq!(normalize_guid("{84de05a3-9d68-41ae-b291-1405bc902389}"), canonical);
    assert_eq!(normalize_guid("urn:uuid:84de05a3-9d68-41ae-b291-1405bc902389"), canonical);
    assert_eq!(normalize_guid("84de05a39d6841aeb2911405bc902389"), canonical);
}

#[test]
fn test_empty_guid_generates_new_one() {
    let model: Model = serde_json::from_value(json!({"guid": ""})).unwrap();
    assert!(Uuid::parse_str(&model.guid).is_ok());
}

#[test]
fn test_null_guid_generates_new_one() {
    let model: Model = serde_json::from_value(json!({"guid": null, "name": "ann"})).unwrap();
    assert!(Uuid::parse_str(&model.guid).is_ok());
    assert_eq!(model.name.as_deref(), Some("ann"));
}

#[test]
fn test_two_new_models_get_distinct_guids() {
    let a = Model::new(Some("martha".to_string()), None);
    let b = Model::new(Some("martha".to_string()), None);
    assert_ne!(a.guid, b.guid);
}

#[test]
fn test_serialization_skips_unset_fields() {
    let model = Model::with_guid("84de05a3-9d68-41ae-b291-1405bc902389");
    let value = serde_json::to_value(&model).unwrap();
    assert_eq!(value, json!({"guid": "84de05a3-9d68-41ae-b291-1405bc902389"}));
}

#[test]
fn test_metadata_round_trips_through_item() {
    let mut metadata = HashMap::new();
    metadata.insert("owner".to_string(), json!("finance"));
    metadata.insert("tags".to_string(), json!(["a", "b"]));
    metadata.insert("version".to_string(), json!(3));

    let model = Model::new(Some("ledger".to_string()), None).with_metadata(metadata.clone());
    let item = model.to_item();
    assert_eq!(item.get("name"), Some(&Value::String("ledger".to_string())));

    let restored = Model::from_item(item).unwrap();
    assert_eq!(restored.metadata, Some(metadata));
    assert_eq!(restored, model);
}

#[test]
fn test_wrong_metadata_shape_is_rejected() {
    let result: Result<Model, _> = serde_json::from_value(json!({"metadata": "nope"}));
    assert!(result.is_err());
}

proptest! {
    #[test]
    fn unparsable_guid_becomes_fresh_v4(candidate in any::<String>()) {
        prop_assume!(Uuid::parse_str(&candidate).is_err());

        let guid = normalize_guid(&candidate);
        let parsed = Uuid::parse_str(&guid).unwrap();
        prop_assert_eq!(parsed.get_version_num(), 4);
        prop_assert_ne!(&guid, &candidate);

        let model: Model = serde_json::from_value(json!({"guid": candidate})).unwrap();
        prop_assert_eq!(Uuid::parse_str(&model.guid).unwrap().get_version_num(), 4);
    }
}
