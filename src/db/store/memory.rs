//! In-memory store for tests and local development

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;
use uuid::Uuid;

use super::{check_collection, RecordStore, StoreError};
use crate::db::models::record::{Document, Record};

type Collections = HashMap<String, IndexMap<Uuid, Document>>;

/// Keeps every collection in an insertion-ordered map behind an `RwLock`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, collection: &str, fields: Document) -> Result<Record, StoreError> {
        check_collection(collection)?;
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned("write"))?;

        let record = Record::new(Uuid::new_v4(), fields);
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(record.id, record.fields.clone());
        Ok(record)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        check_collection(collection)?;
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned("read"))?;

        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Record::new(*id, fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Record>, StoreError> {
        check_collection(collection)?;
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned("read"))?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(&id))
            .map(|fields| Record::new(id, fields.clone())))
    }

    async fn find_by_id_and_update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Document,
    ) -> Result<Option<Record>, StoreError> {
        check_collection(collection)?;
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned("write"))?;

        let Some(fields) = collections.get_mut(collection).and_then(|docs| docs.get_mut(&id)) else {
            return Ok(None);
        };
        fields.extend(patch);
        Ok(Some(Record::new(id, fields.clone())))
    }

    async fn find_by_id_and_delete(&self, collection: &str, id: Uuid) -> Result<Option<Record>, StoreError> {
        check_collection(collection)?;
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned("write"))?;

        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.shift_remove(&id))
            .map(|fields| Record::new(id, fields)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.collections.read().map(|_| ()).map_err(|_| StoreError::Poisoned("read"))
    }

    async fn close(&self) {}
}
