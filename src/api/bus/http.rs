//! HTTP event bus sink.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{EventBus, EventBusError, EventEntry, PutEventsOutput, PutEventsRequest};

/// Posts `{"Entries": [...]}` batches to an HTTP endpoint.
pub struct HttpEventBus {
    client: Client,
    endpoint: Url,
}

/// Error body shape accepted from the remote bus.
#[derive(Debug, Default, Deserialize)]
struct RemoteError {
    #[serde(default, alias = "__type", alias = "Code")]
    code: Option<String>,
    #[serde(default, alias = "Message")]
    message: Option<String>,
}

impl HttpEventBus {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl EventBus for HttpEventBus {
    async fn put_events(&self, entries: Vec<EventEntry>) -> Result<PutEventsOutput, EventBusError> {
        let count = entries.len();
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&PutEventsRequest { entries })
            .send()
            .await
            .map_err(|e| EventBusError::ConnectionError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EventBusError::ConnectionError(e.to_string()))?;

        if !status.is_success() {
            let remote: RemoteError = serde_json::from_str(&body).unwrap_or_default();
            warn!("Event bus returned {} for {} entries", status, count);
            return Err(EventBusError::Rejected {
                code: remote
                    .code
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Error").to_string()),
                message: remote.message.unwrap_or(body),
                status: status.as_u16(),
            });
        }

        debug!("Event bus accepted {} entries", count);
        if body.trim().is_empty() {
            return Ok(PutEventsOutput::accepted(count));
        }
        serde_json::from_str(&body).map_err(|e| EventBusError::Serialization(e.to_string()))
    }
}
