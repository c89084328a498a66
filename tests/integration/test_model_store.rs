//! Integration tests for model CRUD over the in-memory key-value store.

use async_trait::async_trait;
use model_api::models::Model;
use model_api::services::ModelStore;
use model_api::storage::{
    InMemoryKeyValueStore, Item, KeyValueStore, ReturnValues, ScanPage, StorageError,
    WriteCondition,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

fn create_store() -> ModelStore {
    ModelStore::new(Arc::new(InMemoryKeyValueStore::new("models")))
}

fn named(name: &str) -> Model {
    Model::new(Some(name.to_string()), None)
}

/// Delegates to an in-memory table but fails every scan after the first page.
struct FlakyScanStore {
    inner: InMemoryKeyValueStore,
}

#[async_trait]
impl KeyValueStore for FlakyScanStore {
    fn table_name(&self) -> &str {
        self.inner.table_name()
    }

    async fn get_item(&self, key: &str) -> Result<Option<Item>, StorageError> {
        self.inner.get_item(key).await
    }

    async fn put_item(
        &self,
        item: Item,
        condition: WriteCondition,
        return_values: ReturnValues,
    ) -> Result<Option<Item>, StorageError> {
        self.inner.put_item(item, condition, return_values).await
    }

    async fn delete_item(
        &self,
        key: &str,
        condition: WriteCondition,
        return_values: ReturnValues,
    ) -> Result<Option<Item>, StorageError> {
        self.inner.delete_item(key, condition, return_values).await
    }

    async fn scan(
        &self,
        exclusive_start_key: Option<String>,
        limit: Option<usize>,
    ) -> Result<ScanPage, StorageError> {
        if exclusive_start_key.is_some() {
            return Err(StorageError::connection("connection reset during scan"));
        }
        self.inner.scan(None, limit).await
    }
}

#[tokio::test]
async fn test_post_then_get_round_trip() {
    let store = create_store();
    let mut metadata = HashMap::new();
    metadata.insert("term".to_string(), json!(1789));
    let model = named("martha").with_metadata(metadata);

    let created = store.post(&model).await;
    assert_eq!(created.status_code, 200);
    assert_eq!(created.models(), &[model.clone()]);

    let fetched = store.get(&Model::with_guid(&model.guid)).await;
    assert_eq!(fetched.status_code, 200);
    assert!(fetched.errors().is_empty());
    assert_eq!(fetched.models(), &[model]);
}

#[tokio::test]
async fn test_duplicate_post_is_rejected() {
    let store = create_store();
    let model = named("abigail");
    store.post(&model).await;

    let again = store.post(&model).await;
    assert_eq!(again.status_code, 400);
    assert!(again.models().is_empty());
    assert_eq!(again.errors().len(), 1);
    assert_eq!(again.errors()[0].title, "ConditionalCheckFailedException");

    let mut renamed = model.clone();
    renamed.name = Some("abigail adams".to_string());
    assert_eq!(store.post(&renamed).await.status_code, 400);

    let fetched = store.get(&Model::with_guid(&model.guid)).await;
    assert_eq!(fetched.models(), &[model]);
}

#[tokio::test]
async fn test_get_unknown_guid_is_not_found() {
    let store = create_store();
    let missing = Model::with_guid("84de05a3-9d68-41ae-b291-1405bc902389");

    let response = store.get(&missing).await;
    assert_eq!(response.status_code, 400);
    assert!(response.models().is_empty());
    assert_eq!(response.errors()[0].title, "object not found");
    assert_eq!(
        response.errors()[0].detail,
        "Object with guid: 84de05a3-9d68-41ae-b291-1405bc902389 was not found"
    );
}

#[tokio::test]
async fn test_put_returns_old_and_new() {
    let store = create_store();
    let original = named("dolley");
    store.post(&original).await;

    let mut updated = original.clone();
    updated.name = Some("dolley madison".to_string());

    let response = store.put(&updated).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.models(), &[original, updated.clone()]);

    let fetched = store.get(&updated).await;
    assert_eq!(fetched.models(), &[updated]);
}

#[tokio::test]
async fn test_put_unknown_guid_is_rejected() {
    let store = create_store();
    let response = store.put(&named("nobody")).await;
    assert_eq!(response.status_code, 400);
    assert!(response.models().is_empty());
    assert_eq!(response.errors()[0].title, "ConditionalCheckFailedException");
    assert_eq!(store.get_all().await.models().len(), 0);
}

#[tokio::test]
async fn test_delete_returns_removed_model() {
    let store = create_store();
    let model = named("louisa");
    store.post(&model).await;

    let deleted = store.delete(&Model::with_guid(&model.guid)).await;
    assert_eq!(deleted.status_code, 200);
    assert_eq!(deleted.models(), &[model.clone()]);

    let fetched = store.get(&model).await;
    assert_eq!(fetched.status_code, 400);
    assert_eq!(fetched.errors()[0].title, "object not found");
}

#[tokio::test]
async fn test_delete_unknown_guid_is_rejected() {
    let store = create_store();
    let response = store.delete(&named("ghost")).await;
    assert_eq!(response.status_code, 400);
    assert_eq!(response.errors()[0].title, "ConditionalCheckFailedException");
}

#[tokio::test]
async fn test_get_all_returns_every_model() {
    let store = create_store();
    let martha = named("martha");
    let abigail = named("abigail");
    let dolley = named("dolley");
    for model in [&martha, &abigail, &dolley] {
        assert!(store.post(model).await.is_success());
    }

    let response = store.get_all().await;
    assert_eq!(response.status_code, 200);
    let mut names: Vec<_> = response
        .models()
        .iter()
        .filter_map(|m| m.name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["abigail", "dolley", "martha"]);
}

#[tokio::test]
async fn test_get_all_on_empty_table() {
    let response = create_store().get_all().await;
    assert_eq!(response.status_code, 200);
    assert!(response.models().is_empty());
    assert!(response.errors().is_empty());
}

#[tokio::test]
async fn test_get_all_keeps_models_read_before_scan_failure() {
    let inner = InMemoryKeyValueStore::new("models").with_page_size(2);
    let store = ModelStore::new(Arc::new(FlakyScanStore { inner }));
    for name in ["a", "b", "c", "d", "e"] {
        store.post(&named(name)).await;
    }

    let response = store.get_all().await;
    assert_eq!(response.models().len(), 2);
    assert_eq!(response.errors().len(), 1);
    assert_eq!(response.errors()[0].title, "ServiceUnavailable");
    assert_eq!(response.status_code, 503);
}

#[tokio::test]
async fn test_get_all_reports_undecodable_rows() {
    let inner = InMemoryKeyValueStore::new("models");
    let mut bad = Item::new();
    bad.insert("guid".to_string(), json!("84de05a3-9d68-41ae-b291-1405bc902389"));
    bad.insert("metadata".to_string(), json!("not an object"));
    inner
        .put_item(bad, WriteCondition::None, ReturnValues::None)
        .await
        .unwrap();

    let store = ModelStore::new(Arc::new(inner));
    let good = named("martha");
    store.post(&good).await;

    let response = store.get_all().await;
    assert_eq!(response.models(), &[good]);
    assert_eq!(response.errors().len(), 1);
    assert_eq!(response.errors()[0].title, "SerializationException");
    assert_eq!(response.status_code, 500);
}

#[tokio::test]
async fn test_small_page_size_still_reads_everything() {
    let store = create_store().with_page_size(Some(1));
    for name in ["a", "b", "c"] {
        store.post(&named(name)).await;
    }
    assert_eq!(store.get_all().await.models().len(), 3);
}

#[tokio::test]
async fn test_put_over_undecodable_row_appends_nothing() {
    let guid = "84de05a3-9d68-41ae-b291-1405bc902389";
    let inner = InMemoryKeyValueStore::new("models");
    let mut bad = Item::new();
    bad.insert("guid".to_string(), json!(guid));
    bad.insert("metadata".to_string(), json!("not an object"));
    inner
        .put_item(bad, WriteCondition::None, ReturnValues::None)
        .await
        .unwrap();

    let store = ModelStore::new(Arc::new(inner));
    let mut replacement = Model::with_guid(guid);
    replacement.name = Some("martha".to_string());

    let response = store.put(&replacement).await;
    assert!(response.models().is_empty());
    assert_eq!(response.errors().len(), 1);
    assert_eq!(response.errors()[0].title, "SerializationException");
    assert_eq!(response.status_code, 500);
}

#[tokio::test]
async fn test_unbounded_page_size_reads_everything() {
    let store = create_store().with_page_size(Some(usize::MAX));
    for name in ["a", "b", "c"] {
        store.post(&named(name)).await;
    }

    let response = store.get_all().await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.models().len(), 3);
}
