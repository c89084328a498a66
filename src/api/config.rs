//! Service configuration from environment variables.

use std::env;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::models::events::DEFAULT_EVENT_SOURCE;
use crate::services::stream_dispatcher::DEFAULT_BATCH_SIZE;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_TABLE_NAME: &str = "models";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
    #[error("Invalid URL for {name}: {reason}")]
    InvalidUrl { name: String, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Listen port
    pub port: u16,
    /// Table holding the models
    pub table_name: String,
    /// PostgreSQL connection string; in-memory storage when unset
    pub database_url: Option<String>,
    /// Rows per scan page; backend default when unset
    pub scan_page_size: Option<usize>,
    /// HTTP event bus endpoint; events are only logged when unset
    pub event_bus_endpoint: Option<Url>,
    /// Bus name passed through on every event
    pub event_bus_name: Option<String>,
    /// `source` of published events
    pub event_source: String,
    /// Records per dispatch from the in-memory change feed
    pub change_feed_batch_size: usize,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            database_url: None,
            scan_page_size: None,
            event_bus_endpoint: None,
            event_bus_name: None,
            event_source: DEFAULT_EVENT_SOURCE.to_string(),
            change_feed_batch_size: DEFAULT_BATCH_SIZE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let event_bus_endpoint = get("EVENT_BUS_ENDPOINT")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
                    name: "EVENT_BUS_ENDPOINT".to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let log_format = match get("LOG_FORMAT").map(|f| f.to_lowercase()) {
            None => LogFormat::Text,
            Some(f) if f == "text" => LogFormat::Text,
            Some(f) if f == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "LOG_FORMAT".to_string(),
                    value: other,
                });
            }
        };

        Ok(Self {
            port: parse_var(&get, "PORT")?.unwrap_or(defaults.port),
            table_name: get("MODELS_TABLE_NAME")
                .or_else(|| get("DDB_TABLE_NAME"))
                .unwrap_or(defaults.table_name),
            database_url: get("DATABASE_URL"),
            scan_page_size: parse_var::<usize>(&get, "SCAN_PAGE_SIZE")?.filter(|n| *n > 0),
            event_bus_endpoint,
            event_bus_name: get("EVENT_BUS_NAME"),
            event_source: get("EVENT_SOURCE").unwrap_or(defaults.event_source),
            change_feed_batch_size: parse_var(&get, "CHANGE_FEED_BATCH_SIZE")?
                .unwrap_or(defaults.change_feed_batch_size),
            log_level: get("LOG_LEVEL")
                .map(|l| l.to_lowercase())
                .unwrap_or(defaults.log_level),
            log_format,
        })
    }
}

fn parse_var<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, ConfigError> {
    get(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw.clone(),
            })
        })
        .transpose()
}
