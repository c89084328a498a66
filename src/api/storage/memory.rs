//! In-memory key-value store for development and tests.
//!
//! Rows are kept in key order, which is the natural scan order. When a change
//! feed is attached every successful mutation is emitted as a change-stream
//! record, the same shape the stream processor would deliver.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, mpsc};
use tracing::debug;
use uuid::Uuid;

use super::traits::{
    Item, KeyValueStore, ReturnValues, ScanPage, WriteCondition, check_condition, item_key,
};
use super::StorageError;
use crate::models::model::GUID_ATTRIBUTE;
use crate::streams::attribute_value::{AttributeMap, AttributeValue, encode_map};
use crate::streams::{ChangeKind, ChangeRecord, StreamRecord};

/// Default number of rows per scan page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// In-memory key-value store. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryKeyValueStore {
    table_name: String,
    items: Arc<RwLock<BTreeMap<String, Item>>>,
    page_size: usize,
    change_feed: Option<mpsc::UnboundedSender<ChangeRecord>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryKeyValueStore {
    /// Create a new empty store.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            items: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: DEFAULT_PAGE_SIZE,
            change_feed: None,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set the page size used when a scan does not pass a limit.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Emit change records for every mutation onto `sender`.
    pub fn with_change_feed(mut self, sender: mpsc::UnboundedSender<ChangeRecord>) -> Self {
        self.change_feed = Some(sender);
        self
    }

    /// Attach a fresh change feed and return its receiving end.
    pub fn change_feed(self) -> (Self, mpsc::UnboundedReceiver<ChangeRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.with_change_feed(tx), rx)
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    // Called with the table write lock held so records leave in mutation order.
    fn emit(&self, kind: ChangeKind, key: &str, old: Option<&Item>, new: Option<&Item>) {
        let Some(feed) = &self.change_feed else {
            return;
        };

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let mut keys = AttributeMap::new();
        keys.insert(
            GUID_ATTRIBUTE.to_string(),
            AttributeValue::S(key.to_string()),
        );

        let record = ChangeRecord {
            event_id: Some(Uuid::new_v4().to_string()),
            event_name: kind.as_str().to_string(),
            event_source: Some(format!("memory:{}", self.table_name)),
            dynamodb: StreamRecord {
                keys,
                new_image: new.map(encode_map),
                old_image: old.map(encode_map),
                sequence_number: Some(format!("{:021}", sequence)),
                stream_view_type: Some("NEW_AND_OLD_IMAGES".to_string()),
            },
        };

        if feed.send(record).is_err() {
            debug!("Change feed closed, dropping {} record for {}", kind, key);
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn get_item(&self, key: &str) -> Result<Option<Item>, StorageError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn put_item(
        &self,
        item: Item,
        condition: WriteCondition,
        return_values: ReturnValues,
    ) -> Result<Option<Item>, StorageError> {
        let key = item_key(&item)?.to_string();
        let mut items = self.items.write().await;

        let previous = items.get(&key).cloned();
        check_condition(condition, previous.is_some())?;

        items.insert(key.clone(), item.clone());
        let kind = if previous.is_some() {
            ChangeKind::Modify
        } else {
            ChangeKind::Insert
        };
        self.emit(kind, &key, previous.as_ref(), Some(&item));

        Ok(match return_values {
            ReturnValues::AllOld => previous,
            ReturnValues::None => None,
        })
    }

    async fn delete_item(
        &self,
        key: &str,
        condition: WriteCondition,
        return_values: ReturnValues,
    ) -> Result<Option<Item>, StorageError> {
        let mut items = self.items.write().await;
        check_condition(condition, items.contains_key(key))?;

        let removed = items.remove(key);
        if let Some(old) = &removed {
            self.emit(ChangeKind::Remove, key, Some(old), None);
        }

        Ok(match return_values {
            ReturnValues::AllOld => removed,
            ReturnValues::None => None,
        })
    }

    async fn scan(
        &self,
        exclusive_start_key: Option<String>,
        limit: Option<usize>,
    ) -> Result<ScanPage, StorageError> {
        let limit = limit.unwrap_or(self.page_size).max(1);
        let items = self.items.read().await;

        let lower = match &exclusive_start_key {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Unbounded,
        };

        // One extra row tells us whether another page follows.
        let mut page: Vec<(&String, &Item)> = items
            .range((lower, Bound::Unbounded))
            .take(limit.saturating_add(1))
            .collect();
        let has_more = page.len() > limit;
        page.truncate(limit);

        let last_evaluated_key = if has_more {
            page.last().map(|(key, _)| (*key).clone())
        } else {
            None
        };

        Ok(ScanPage {
            items: page.into_iter().map(|(_, item)| item.clone()).collect(),
            last_evaluated_key,
        })
    }
}
