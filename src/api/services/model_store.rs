//! CRUD operations for models against the key-value store.
//!
//! Every operation returns a [`Response`]. Store failures never escape: they
//! are logged and recorded on the envelope as model errors.

use futures_util::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, error};

use crate::models::{Model, ModelError, Response};
use crate::storage::{Item, KeyValueStore, ReturnValues, StorageError, WriteCondition};

/// Position of a scan between pages.
enum ScanState {
    Start,
    Next(String),
    Done,
}

/// Model CRUD over a single table keyed by `guid`.
#[derive(Clone)]
pub struct ModelStore {
    store: Arc<dyn KeyValueStore>,
    page_size: Option<usize>,
}

impl ModelStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            page_size: None,
        }
    }

    /// Rows requested per scan page; `None` leaves it to the backend.
    pub fn with_page_size(mut self, page_size: Option<usize>) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn table_name(&self) -> &str {
        self.store.table_name()
    }

    /// Create `model`. Fails if a model with the same guid exists.
    pub async fn post(&self, model: &Model) -> Response {
        let mut response = Response::new();
        match self
            .store
            .put_item(model.to_item(), WriteCondition::KeyNotExists, ReturnValues::None)
            .await
        {
            Ok(_) => {
                debug!("Created model {}", model.guid);
                response.add_model(model.clone());
            }
            Err(e) => {
                error!("Failed to create model {}: {}", model.guid, e);
                response.add_service_error(&e);
            }
        }
        response
    }

    /// Read the stored model with `model.guid`.
    pub async fn get(&self, model: &Model) -> Response {
        let mut response = Response::new();
        match self.store.get_item(&model.guid).await {
            Ok(Some(item)) => match decode_model(item) {
                Ok(stored) => response.add_model(stored),
                Err(e) => {
                    error!("Failed to decode model {}: {}", model.guid, e);
                    response.add_service_error(&e);
                }
            },
            Ok(None) => response.add_model_error(ModelError::not_found(&model.guid)),
            Err(e) => {
                error!("Failed to read model {}: {}", model.guid, e);
                response.add_service_error(&e);
            }
        }
        response
    }

    /// Lazy sequence of scan pages over the whole table.
    ///
    /// Ends when the store reports no continuation token, or right after the
    /// first failed page. Each call starts a new scan from the beginning.
    pub fn scan_pages(&self) -> impl Stream<Item = Result<Vec<Item>, StorageError>> + Send + '_ {
        stream::unfold(ScanState::Start, move |state| async move {
            let start_key = match state {
                ScanState::Start => None,
                ScanState::Next(key) => Some(key),
                ScanState::Done => return None,
            };

            match self.store.scan(start_key, self.page_size).await {
                Ok(page) => {
                    let next = match page.last_evaluated_key {
                        Some(key) => ScanState::Next(key),
                        None => ScanState::Done,
                    };
                    Some((Ok(page.items), next))
                }
                Err(e) => Some((Err(e), ScanState::Done)),
            }
        })
    }

    /// Every stored model, in store order.
    ///
    /// On a failed page the models read so far are returned alongside the error.
    pub async fn get_all(&self) -> Response {
        let mut response = Response::new();
        let mut models = Vec::new();

        let mut pages = Box::pin(self.scan_pages());
        while let Some(page) = pages.next().await {
            match page {
                Ok(items) => {
                    for item in items {
                        match decode_model(item) {
                            Ok(model) => models.push(model),
                            Err(e) => {
                                error!("Skipping undecodable row: {}", e);
                                response.add_service_error(&e);
                            }
                        }
                    }
                }
                Err(e) => {
                    error!("Scan of {} failed: {}", self.table_name(), e);
                    response.add_service_error(&e);
                }
            }
        }

        debug!("Scanned {} models from {}", models.len(), self.table_name());
        response.add_models(models);
        response
    }

    /// Replace an existing model.
    ///
    /// On success the response holds the previous value followed by `model`.
    pub async fn put(&self, model: &Model) -> Response {
        let mut response = Response::new();
        match self
            .store
            .put_item(model.to_item(), WriteCondition::KeyExists, ReturnValues::AllOld)
            .await
        {
            Ok(previous) => {
                if let Some(item) = previous {
                    match decode_model(item) {
                        Ok(old) => response.add_model(old),
                        Err(e) => {
                            error!("Failed to decode previous model {}: {}", model.guid, e);
                            response.add_service_error(&e);
                            return response;
                        }
                    }
                }
                response.add_model(model.clone());
            }
            Err(e) => {
                error!("Failed to update model {}: {}", model.guid, e);
                response.add_service_error(&e);
            }
        }
        response
    }

    /// Delete an existing model, returning the removed value.
    pub async fn delete(&self, model: &Model) -> Response {
        let mut response = Response::new();
        match self
            .store
            .delete_item(&model.guid, WriteCondition::KeyExists, ReturnValues::AllOld)
            .await
        {
            Ok(Some(item)) => match decode_model(item) {
                Ok(removed) => response.add_model(removed),
                Err(e) => {
                    error!("Failed to decode removed model {}: {}", model.guid, e);
                    response.add_service_error(&e);
                }
            },
            Ok(None) => debug!("Delete of {} returned no previous value", model.guid),
            Err(e) => {
                error!("Failed to delete model {}: {}", model.guid, e);
                response.add_service_error(&e);
            }
        }
        response
    }
}

fn decode_model(item: Item) -> Result<Model, StorageError> {
    Model::from_item(item).map_err(|e| StorageError::serialization(e.to_string()))
}
