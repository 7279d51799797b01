//! REST handlers shared by every request kind.
//!
//! The handlers are generic over [`ResourceService`]; `resource_api!` stamps out
//! one documented module per request kind that routes to them.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};

use crate::db::models::record::Record;
use crate::db::service::ResourceService;
use crate::error::{FieldError, ServiceError};
use crate::report::{AttachmentSink, ReportStyle};

fn unreadable_body(err: JsonRejection) -> ServiceError {
    ServiceError::Validation(vec![FieldError::new("body", err.body_text())])
}

pub async fn create_record(
    State(service): State<ResourceService>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ServiceError> {
    let Json(body) = body.map_err(unreadable_body)?;
    let record = service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_records(
    State(service): State<ResourceService>,
) -> Result<Json<Vec<Record>>, ServiceError> {
    Ok(Json(service.list().await?))
}

pub async fn get_record(
    State(service): State<ResourceService>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ServiceError> {
    Ok(Json(service.get(&id).await?))
}

pub async fn update_record(
    State(service): State<ResourceService>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Record>, ServiceError> {
    let Json(body) = body.map_err(unreadable_body)?;
    Ok(Json(service.update(&id, &body).await?))
}

pub async fn delete_record(
    State(service): State<ResourceService>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    service.delete(&id).await?;
    Ok(Json(json!({ "message": format!("{} deleted", service.schema().name) })))
}

pub async fn download_report(State(service): State<ResourceService>) -> Result<Response, ServiceError> {
    let report = service.report(ReportStyle::Labeled).await?;
    Ok(report.deliver(AttachmentSink)?)
}

macro_rules! resource_api {
    ($module:ident, $model:ident, $tag:tt, $collection_path:tt, $item_path:tt, $pdf_path:tt) => {
        pub mod $module {
            use axum::extract::rejection::JsonRejection;
            use axum::extract::{Path, State};
            use axum::http::StatusCode;
            use axum::response::Response;
            use axum::routing::get;
            use axum::{Json, Router};
            use serde_json::Value;

            use crate::db::models::record::Record;
            use crate::db::models::requests::{$model, ApprovalStatus};
            use crate::db::service::ResourceService;
            use crate::error::ServiceError;

            #[utoipa::path(
                post,
                path = $collection_path,
                request_body = $model,
                responses(
                    (status = 201, description = "Request created", body = $model),
                    (status = 400, description = "Missing or malformed fields"),
                    (status = 500, description = "Store unavailable")
                ),
                tag = $tag
            )]
            pub async fn create(
                state: State<ResourceService>,
                body: Result<Json<Value>, JsonRejection>,
            ) -> Result<(StatusCode, Json<Record>), ServiceError> {
                super::create_record(state, body).await
            }

            #[utoipa::path(
                get,
                path = $collection_path,
                responses(
                    (status = 200, description = "All requests in store order", body = Vec<$model>),
                    (status = 500, description = "Store unavailable")
                ),
                tag = $tag
            )]
            pub async fn list(state: State<ResourceService>) -> Result<Json<Vec<Record>>, ServiceError> {
                super::list_records(state).await
            }

            #[utoipa::path(
                get,
                path = $item_path,
                params(("id" = String, Path, description = "Request id")),
                responses(
                    (status = 200, description = "Request found", body = $model),
                    (status = 404, description = "Request not found")
                ),
                tag = $tag
            )]
            pub async fn get_one(
                state: State<ResourceService>,
                id: Path<String>,
            ) -> Result<Json<Record>, ServiceError> {
                super::get_record(state, id).await
            }

            #[utoipa::path(
                put,
                path = $item_path,
                params(("id" = String, Path, description = "Request id")),
                request_body = $model,
                responses(
                    (status = 200, description = "Request updated", body = $model),
                    (status = 400, description = "Malformed fields or empty update"),
                    (status = 404, description = "Request not found")
                ),
                tag = $tag
            )]
            pub async fn update(
                state: State<ResourceService>,
                id: Path<String>,
                body: Result<Json<Value>, JsonRejection>,
            ) -> Result<Json<Record>, ServiceError> {
                super::update_record(state, id, body).await
            }

            #[utoipa::path(
                delete,
                path = $item_path,
                params(("id" = String, Path, description = "Request id")),
                responses(
                    (status = 200, description = "Request deleted"),
                    (status = 404, description = "Request not found")
                ),
                tag = $tag
            )]
            pub async fn remove(
                state: State<ResourceService>,
                id: Path<String>,
            ) -> Result<Json<Value>, ServiceError> {
                super::delete_record(state, id).await
            }

            #[utoipa::path(
                get,
                path = $pdf_path,
                responses(
                    (status = 200, description = "PDF report of every request", content_type = "application/pdf"),
                    (status = 500, description = "Store unavailable or rendering failed")
                ),
                tag = $tag
            )]
            pub async fn report(state: State<ResourceService>) -> Result<Response, ServiceError> {
                super::download_report(state).await
            }

            #[derive(utoipa::OpenApi)]
            #[openapi(
                paths(create, list, get_one, update, remove, report),
                components(schemas($model, ApprovalStatus)),
                tags((name = $tag))
            )]
            pub struct Doc;

            pub fn routes(service: ResourceService) -> Router {
                Router::new()
                    .route("/", get(list).post(create))
                    .route("/pdf", get(report))
                    .route("/{id}", get(get_one).put(update).delete(remove))
                    .with_state(service)
            }
        }
    };
}

resource_api!(
    design,
    DesignRequest,
    "Design Requests",
    "/api/designRequests",
    "/api/designRequests/{id}",
    "/api/designRequests/pdf"
);

resource_api!(
    material,
    MaterialRequest,
    "Material Requests",
    "/api/materialRequests",
    "/api/materialRequests/{id}",
    "/api/materialRequests/pdf"
);

resource_api!(
    size_chart,
    SizeChartRequest,
    "Size Chart Requests",
    "/api/sizeChartRequests",
    "/api/sizeChartRequests/{id}",
    "/api/sizeChartRequests/pdf"
);
