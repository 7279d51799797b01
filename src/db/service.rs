//! Generic CRUD service, instantiated once per [`ResourceSchema`].

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::models::record::Record;
use crate::db::schema::{self, ResourceSchema};
use crate::db::store::RecordStore;
use crate::error::ServiceError;
use crate::report::{Report, ReportStyle};

#[derive(Clone)]
pub struct ResourceService {
    schema: &'static ResourceSchema,
    store: Arc<dyn RecordStore>,
    clock: fn() -> NaiveDate,
}

impl ResourceService {
    pub fn new(schema: &'static ResourceSchema, store: Arc<dyn RecordStore>) -> Self {
        Self {
            schema,
            store,
            clock: schema::today,
        }
    }

    /// Replaces the source of "today" used by the future-date check.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    pub async fn create(&self, input: &Value) -> Result<Record, ServiceError> {
        let fields = self
            .schema
            .validate_new(input, (self.clock)())
            .map_err(ServiceError::Validation)?;

        let record = self.store.insert(self.schema.collection, fields).await?;
        info!(collection = self.schema.collection, id = %record.id, "record created");
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<Record>, ServiceError> {
        let records = self.store.find_all(self.schema.collection).await?;
        debug!(collection = self.schema.collection, count = records.len(), "records listed");
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<Record, ServiceError> {
        let uuid = self.parse_id(id)?;
        self.store
            .find_by_id(self.schema.collection, uuid)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn update(&self, id: &str, input: &Value) -> Result<Record, ServiceError> {
        let uuid = self.parse_id(id)?;
        let patch = self
            .schema
            .validate_patch(input, (self.clock)())
            .map_err(ServiceError::Validation)?;

        match self.store.find_by_id_and_update(self.schema.collection, uuid, patch).await? {
            Some(record) => {
                info!(collection = self.schema.collection, id = %record.id, "record updated");
                Ok(record)
            }
            None => Err(self.not_found(id)),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let uuid = self.parse_id(id)?;
        match self.store.find_by_id_and_delete(self.schema.collection, uuid).await? {
            Some(_) => {
                info!(collection = self.schema.collection, %id, "record deleted");
                Ok(())
            }
            None => Err(self.not_found(id)),
        }
    }

    /// Fetches the full record set and renders it; no document on failure.
    pub async fn report(&self, style: ReportStyle) -> Result<Report, ServiceError> {
        let records = self.list().await?;
        let report = Report::generate(self.schema, &records, style)?;
        info!(
            collection = self.schema.collection,
            records = records.len(),
            bytes = report.bytes.len(),
            "report generated"
        );
        Ok(report)
    }

    fn parse_id(&self, id: &str) -> Result<Uuid, ServiceError> {
        Uuid::parse_str(id).map_err(|_| {
            warn!(collection = self.schema.collection, %id, "malformed record id");
            self.not_found(id)
        })
    }

    fn not_found(&self, id: &str) -> ServiceError {
        ServiceError::NotFound {
            resource: self.schema.name,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::requests::{ApprovalStatus, MaterialRequest};
    use crate::db::schema::{DESIGN_REQUESTS, MATERIAL_REQUESTS, SIZE_CHART_REQUESTS};
    use crate::db::store::MemoryStore;
    use serde_json::json;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn service(schema: &'static ResourceSchema) -> ResourceService {
        ResourceService::new(schema, Arc::new(MemoryStore::new())).with_clock(fixed_today)
    }

    fn cotton() -> Value {
        json!({
            "materialId": "M1",
            "materialName": "Cotton",
            "type": "Fabric",
            "date": "2024-01-01",
            "quantity": "50",
            "approvalStatus": "Pending"
        })
    }

    #[tokio::test]
    async fn material_request_lifecycle() {
        let service = service(&MATERIAL_REQUESTS);

        let created = service.create(&cotton()).await.unwrap();
        let listed = service.list().await.unwrap();
        assert_eq!(listed, vec![created.clone()]);
        for (key, value) in cotton().as_object().unwrap() {
            assert_eq!(&listed[0].fields[key], value);
        }

        let id = created.id.to_string();
        let updated = service.update(&id, &json!({ "approvalStatus": "Approved" })).await.unwrap();
        assert_eq!(updated.id, created.id);

        let typed: MaterialRequest = service.list().await.unwrap()[0].decode().unwrap();
        assert_eq!(typed.quantity, "50");
        assert_eq!(typed.approval_status, ApprovalStatus::Approved);

        service.delete(&id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let service = service(&MATERIAL_REQUESTS);
        let id = service.create(&cotton()).await.unwrap().id.to_string();

        service.delete(&id).await.unwrap();
        let err = service.delete(&id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn missing_and_malformed_ids_are_not_found() {
        let service = service(&DESIGN_REQUESTS);
        let patch = json!({ "approvalStatus": "Rejected" });

        let err = service.update(&Uuid::new_v4().to_string(), &patch).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
        let err = service.update("not-a-uuid", &patch).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
        let err = service.get("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn empty_create_persists_nothing() {
        for schema in schema::ALL {
            let service = service(schema);
            let err = service.create(&json!({})).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
            assert!(service.list().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn status_defaults_to_pending() {
        let service = service(&SIZE_CHART_REQUESTS);
        let created = service
            .create(&json!({
                "country": "Sri Lanka",
                "size": "M",
                "measurements": { "chest": 40, "waist": 32, "hip": 38, "sleeveLength": 24.5 },
                "date": "2024-05-31"
            }))
            .await
            .unwrap();
        assert_eq!(created.fields["approvalStatus"], "Pending");
    }

    #[tokio::test]
    async fn size_chart_round_trips_measurements_unchanged() {
        let service = service(&SIZE_CHART_REQUESTS);
        let input = json!({
            "country": "Sri Lanka",
            "size": "M",
            "measurements": { "chest": 40, "waist": 32, "hip": 38, "sleeveLength": 24.5 },
            "date": "2024-05-31",
            "approvalStatus": "Approved"
        });
        service.create(&input).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        for (key, value) in input.as_object().unwrap() {
            assert_eq!(&listed[0].fields[key], value, "field {key}");
        }
    }

    #[tokio::test]
    async fn update_rejects_future_date_and_keeps_record() {
        let service = service(&MATERIAL_REQUESTS);
        let id = service.create(&cotton()).await.unwrap().id.to_string();

        let err = service.update(&id, &json!({ "date": "2024-06-02" })).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(service.get(&id).await.unwrap().fields["date"], "2024-01-01");
    }
}
