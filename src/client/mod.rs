//! Client side of the request tracker: an HTTP API client and the
//! form/table controller that drives one request kind's page.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::db::models::record::Record;
use crate::db::schema::ResourceSchema;
use crate::report::FileSink;

pub mod controller;
pub mod http;

pub use controller::{filter_records, FormController, Notice, NoticeLevel};
pub use http::HttpResourceClient;

/// Failures seen by the client, in the same taxonomy the server uses.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The four calls a page makes against one resource.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Record>, ClientError>;

    async fn create(&self, fields: &Value) -> Result<Record, ClientError>;

    async fn update(&self, id: Uuid, fields: &Value) -> Result<Record, ClientError>;

    async fn delete(&self, id: Uuid) -> Result<(), ClientError>;
}

/// A controller for one request kind, talking to `API_BASE_URL`.
pub fn form_for(
    config: &Config,
    http: reqwest::Client,
    schema: &'static ResourceSchema,
) -> FormController<HttpResourceClient> {
    FormController::new(schema, HttpResourceClient::new(http, &config.api_base_url, schema))
}

/// Exports land in `REPORT_DIR`.
pub fn report_sink(config: &Config) -> FileSink {
    FileSink::new(&config.report_dir)
}
