//! Key-value store contract shared by the storage backends.

use serde_json::{Map, Value};

use super::StorageError;
use crate::models::model::GUID_ATTRIBUTE;

/// A stored row: attribute name to plain JSON value. Always carries the key.
pub type Item = Map<String, Value>;

/// Predicate a write must satisfy against the current row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WriteCondition {
    /// Unconditional
    #[default]
    None,
    /// Succeed only if no row has this key
    KeyNotExists,
    /// Succeed only if a row with this key exists
    KeyExists,
}

/// What a write hands back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReturnValues {
    #[default]
    None,
    /// The row as it was before the write
    AllOld,
}

/// One page of a scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Item>,
    /// Continuation token; `None` once the table is exhausted.
    pub last_evaluated_key: Option<String>,
}

/// Storage backend trait for a single table keyed by `guid`.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Name of the backing table
    fn table_name(&self) -> &str;

    /// Point read by key
    async fn get_item(&self, key: &str) -> Result<Option<Item>, StorageError>;

    /// Write `item` if `condition` holds.
    ///
    /// Returns the previous row when `return_values` is `AllOld` and one existed.
    async fn put_item(
        &self,
        item: Item,
        condition: WriteCondition,
        return_values: ReturnValues,
    ) -> Result<Option<Item>, StorageError>;

    /// Delete the row for `key` if `condition` holds.
    ///
    /// Returns the removed row when `return_values` is `AllOld` and one existed.
    async fn delete_item(
        &self,
        key: &str,
        condition: WriteCondition,
        return_values: ReturnValues,
    ) -> Result<Option<Item>, StorageError>;

    /// Read one page of rows after `exclusive_start_key`, in key order.
    async fn scan(
        &self,
        exclusive_start_key: Option<String>,
        limit: Option<usize>,
    ) -> Result<ScanPage, StorageError>;
}

/// Key of `item`, which must be a string `guid` attribute.
pub fn item_key(item: &Item) -> Result<&str, StorageError> {
    item.get(GUID_ATTRIBUTE)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            StorageError::validation(format!(
                "One of the required keys was not given a value: {}",
                GUID_ATTRIBUTE
            ))
        })
}

/// Check `condition` against whether a row currently exists.
pub fn check_condition(condition: WriteCondition, exists: bool) -> Result<(), StorageError> {
    match (condition, exists) {
        (WriteCondition::KeyNotExists, true) | (WriteCondition::KeyExists, false) => {
            Err(StorageError::conditional_check_failed())
        }
        _ => Ok(()),
    }
}
