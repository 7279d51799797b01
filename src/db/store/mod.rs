//! Record store abstraction.
//!
//! The store knows nothing about request kinds: it keeps one ordered
//! collection of JSON documents per name and assigns ids on insert.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::record::{Document, Record};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid collection name `{0}`")]
    InvalidCollection(String),

    #[error("stored document {id} in `{collection}` is not an object")]
    Corrupt { collection: String, id: Uuid },

    #[error("failed to acquire {0} lock")]
    Poisoned(&'static str),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persists a new document and returns it with its assigned id.
    async fn insert(&self, collection: &str, fields: Document) -> Result<Record, StoreError>;

    /// All documents of a collection, in insertion order.
    async fn find_all(&self, collection: &str) -> Result<Vec<Record>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Record>, StoreError>;

    /// Merges `patch` over the stored top-level fields; `None` if absent.
    async fn find_by_id_and_update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Document,
    ) -> Result<Option<Record>, StoreError>;

    /// Removes a document and returns it; `None` if absent.
    async fn find_by_id_and_delete(&self, collection: &str, id: Uuid) -> Result<Option<Record>, StoreError>;

    /// Round trip used by readiness checks.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn close(&self);
}

/// Collection names end up in SQL identifiers, so keep them to `[a-z_]`.
pub(crate) fn check_collection(collection: &str) -> Result<(), StoreError> {
    let valid = !collection.is_empty()
        && collection.chars().all(|c| c.is_ascii_lowercase() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(collection.to_string()))
    }
}
