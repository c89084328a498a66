//! PostgreSQL storage backend implementation.
//!
//! Uses sqlx for database operations and implements the KeyValueStore trait.
//! Rows live in a two-column table: `guid TEXT PRIMARY KEY, item JSONB`.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};
use tracing::info;

use super::traits::{
    Item, KeyValueStore, ReturnValues, ScanPage, WriteCondition, check_condition, item_key,
};
use super::StorageError;

/// Rows per scan page when the caller gives no limit.
pub const DEFAULT_SCAN_LIMIT: usize = 100;

/// PostgreSQL storage backend implementation.
pub struct PostgresKeyValueStore {
    pool: PgPool,
    table_name: String,
}

impl PostgresKeyValueStore {
    /// Create a new PostgreSQL storage backend for `table_name`.
    ///
    /// The name is spliced into SQL, so only plain identifiers are accepted.
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Result<Self, StorageError> {
        let table_name = table_name.into();
        if !is_valid_identifier(&table_name) {
            return Err(StorageError::validation(format!(
                "Invalid table name: {}",
                table_name
            )));
        }
        Ok(Self { pool, table_name })
    }

    /// Connect to `database_url` and make sure the table exists.
    pub async fn connect(database_url: &str, table_name: &str) -> Result<Self, StorageError> {
        let pool = PgPool::connect(database_url).await.map_err(|e| {
            StorageError::connection(format!("Failed to connect to database: {}", e))
        })?;
        let store = Self::new(pool, table_name)?;
        store.ensure_table().await?;
        Ok(store)
    }

    /// Create the backing table if it is missing.
    pub async fn ensure_table(&self) -> Result<(), StorageError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (guid TEXT PRIMARY KEY, item JSONB NOT NULL)",
            self.table_name
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        info!("PostgreSQL table {} ready", self.table_name);
        Ok(())
    }

    fn decode_item(value: Value) -> Result<Item, StorageError> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(StorageError::serialization(format!(
                "Stored item is not an object: {}",
                other
            ))),
        }
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
impl KeyValueStore for PostgresKeyValueStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn get_item(&self, key: &str) -> Result<Option<Item>, StorageError> {
        let sql = format!("SELECT item FROM {} WHERE guid = $1", self.table_name);
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::decode_item(row.try_get::<Value, _>("item")?)?)),
            None => Ok(None),
        }
    }

    async fn put_item(
        &self,
        item: Item,
        condition: WriteCondition,
        return_values: ReturnValues,
    ) -> Result<Option<Item>, StorageError> {
        let key = item_key(&item)?.to_string();
        let data = Value::Object(item);

        if condition == WriteCondition::KeyNotExists {
            // No previous row can exist, so there is nothing to hand back.
            let sql = format!(
                "INSERT INTO {} (guid, item) VALUES ($1, $2) ON CONFLICT (guid) DO NOTHING",
                self.table_name
            );
            let result = sqlx::query(&sql)
                .bind(&key)
                .bind(&data)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StorageError::conditional_check_failed());
            }
            return Ok(None);
        }

        let mut tx = self.pool.begin().await?;

        let select = format!(
            "SELECT item FROM {} WHERE guid = $1 FOR UPDATE",
            self.table_name
        );
        let previous = sqlx::query(&select)
            .bind(&key)
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| row.try_get::<Value, _>("item"))
            .transpose()?
            .map(Self::decode_item)
            .transpose()?;

        check_condition(condition, previous.is_some())?;

        let upsert = format!(
            "INSERT INTO {} (guid, item) VALUES ($1, $2) \
             ON CONFLICT (guid) DO UPDATE SET item = EXCLUDED.item",
            self.table_name
        );
        sqlx::query(&upsert)
            .bind(&key)
            .bind(&data)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

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
        if condition == WriteCondition::KeyNotExists {
            let sql = format!("SELECT 1 FROM {} WHERE guid = $1", self.table_name);
            let exists = sqlx::query(&sql)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?
                .is_some();
            check_condition(condition, exists)?;
            return Ok(None);
        }

        let sql = format!(
            "DELETE FROM {} WHERE guid = $1 RETURNING item",
            self.table_name
        );
        let removed = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| row.try_get::<Value, _>("item"))
            .transpose()?
            .map(Self::decode_item)
            .transpose()?;

        check_condition(condition, removed.is_some())?;

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
        let limit = limit.unwrap_or(DEFAULT_SCAN_LIMIT).max(1);
        let sql = format!(
            "SELECT guid, item FROM {} WHERE ($1::TEXT IS NULL OR guid > $1) \
             ORDER BY guid LIMIT $2",
            self.table_name
        );
        // Fetch one extra row to learn whether another page follows.
        let fetch = i64::try_from(limit.saturating_add(1)).unwrap_or(i64::MAX);
        let rows = sqlx::query(&sql)
            .bind(exclusive_start_key)
            .bind(fetch)
            .fetch_all(&self.pool)
            .await?;

        let has_more = rows.len() > limit;
        let mut items = Vec::with_capacity(limit.min(rows.len()));
        let mut last_key = None;
        for row in rows.into_iter().take(limit) {
            last_key = Some(row.try_get::<String, _>("guid")?);
            items.push(Self::decode_item(row.try_get::<Value, _>("item")?)?);
        }

        Ok(ScanPage {
            items,
            last_evaluated_key: if has_more { last_key } else { None },
        })
    }
}
