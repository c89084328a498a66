//! Application state management.
//!
//! Defines the AppState struct that holds the model store and the change
//! stream dispatcher, each wired to its injected backend.

use axum::extract::FromRef;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::bus::{EventBus, HttpEventBus, LogEventBus};
use crate::config::Config;
use crate::services::{ChangeEventTranslator, ModelStore, StreamDispatcher};
use crate::storage::{InMemoryKeyValueStore, KeyValueStore, PostgresKeyValueStore, StorageError};
use crate::streams::ChangeRecord;

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// CRUD operations for models
    pub model_store: ModelStore,
    /// Change record dispatcher
    pub dispatcher: StreamDispatcher,
}

impl AppState {
    /// Create state over an explicit store and event bus.
    pub fn new(store: Arc<dyn KeyValueStore>, bus: Arc<dyn EventBus>) -> Self {
        Self {
            model_store: ModelStore::new(store),
            dispatcher: StreamDispatcher::new(ChangeEventTranslator::new(bus)),
        }
    }

    /// In-memory store and logging bus, for development and tests.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryKeyValueStore::new(crate::config::DEFAULT_TABLE_NAME)),
            Arc::new(LogEventBus::new()),
        )
    }

    /// Build state from configuration.
    ///
    /// Connects to PostgreSQL if DATABASE_URL is set, otherwise uses the
    /// in-memory store and returns its change feed for the dispatcher.
    pub async fn from_config(
        config: &Config,
    ) -> Result<(Self, Option<mpsc::UnboundedReceiver<ChangeRecord>>), StorageError> {
        let (store, feed) = match &config.database_url {
            Some(database_url) => {
                info!("Using PostgreSQL storage (table {})", config.table_name);
                let store = PostgresKeyValueStore::connect(database_url, &config.table_name).await?;
                (Arc::new(store) as Arc<dyn KeyValueStore>, None)
            }
            None => {
                info!("Using in-memory storage (table {})", config.table_name);
                let (store, feed) = InMemoryKeyValueStore::new(config.table_name.clone())
                    .change_feed();
                (Arc::new(store) as Arc<dyn KeyValueStore>, Some(feed))
            }
        };

        let bus: Arc<dyn EventBus> = match &config.event_bus_endpoint {
            Some(endpoint) => {
                info!("Publishing change events to {}", endpoint);
                Arc::new(HttpEventBus::new(endpoint.clone()))
            }
            None => {
                info!("EVENT_BUS_ENDPOINT not set, change events will be logged");
                Arc::new(LogEventBus::new())
            }
        };

        let translator = ChangeEventTranslator::new(bus)
            .with_source(config.event_source.clone())
            .with_event_bus_name(config.event_bus_name.clone());

        let state = Self {
            model_store: ModelStore::new(store).with_page_size(config.scan_page_size),
            dispatcher: StreamDispatcher::new(translator),
        };
        Ok((state, feed))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}

// Allow handlers to extract individual services (for Axum)
impl FromRef<AppState> for ModelStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.model_store.clone()
    }
}

impl FromRef<AppState> for StreamDispatcher {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.dispatcher.clone()
    }
}
