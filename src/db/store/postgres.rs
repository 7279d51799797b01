//! Postgres-backed store. Each collection is a table of JSONB documents.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{check_collection, RecordStore, StoreError};
use crate::db::models::record::{Document, Record};

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    data: Json<Value>,
}

impl DocumentRow {
    fn into_record(self, collection: &str) -> Result<Record, StoreError> {
        match self.data.0 {
            Value::Object(fields) => Ok(Record::new(self.id, fields)),
            _ => Err(StoreError::Corrupt {
                collection: collection.to_string(),
                id: self.id,
            }),
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and makes sure a table exists for every collection.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        collections: &[&str],
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;

        let store = Self { pool };
        for collection in collections {
            store.ensure_collection(collection).await?;
        }
        Ok(store)
    }

    async fn ensure_collection(&self, collection: &str) -> Result<(), StoreError> {
        check_collection(collection)?;
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {collection} (
                id UUID PRIMARY KEY,
                seq BIGSERIAL NOT NULL,
                data JSONB NOT NULL
            )"
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        tracing::debug!(collection, "collection ready");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert(&self, collection: &str, fields: Document) -> Result<Record, StoreError> {
        check_collection(collection)?;
        let sql = format!("INSERT INTO {collection} (id, data) VALUES ($1, $2) RETURNING id, data");
        let row: DocumentRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(Json(Value::Object(fields)))
            .fetch_one(&self.pool)
            .await?;
        row.into_record(collection)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        check_collection(collection)?;
        let sql = format!("SELECT id, data FROM {collection} ORDER BY seq");
        let rows: Vec<DocumentRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(|row| row.into_record(collection)).collect()
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Record>, StoreError> {
        check_collection(collection)?;
        let sql = format!("SELECT id, data FROM {collection} WHERE id = $1");
        let row: Option<DocumentRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|row| row.into_record(collection)).transpose()
    }

    async fn find_by_id_and_update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Document,
    ) -> Result<Option<Record>, StoreError> {
        check_collection(collection)?;
        // `||` replaces top-level keys, nested groups are overwritten whole.
        let sql = format!("UPDATE {collection} SET data = data || $2 WHERE id = $1 RETURNING id, data");
        let row: Option<DocumentRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(Json(Value::Object(patch)))
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| row.into_record(collection)).transpose()
    }

    async fn find_by_id_and_delete(&self, collection: &str, id: Uuid) -> Result<Option<Record>, StoreError> {
        check_collection(collection)?;
        let sql = format!("DELETE FROM {collection} WHERE id = $1 RETURNING id, data");
        let row: Option<DocumentRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|row| row.into_record(collection)).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        tracing::info!("🛠️ Closing database pool...");
        self.pool.close().await;
        tracing::info!("✅ Database pool closed.");
    }
}
