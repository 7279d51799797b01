//! Garment request tracker: REST API, PDF reports and the form/table client
//! for design, material and size chart requests.

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod report;
pub mod utils;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa_rapidoc::RapiDoc;
use utoipa_swagger_ui::SwaggerUi;

use crate::app_state::AppState;
use crate::middleware::request_logger::log_requests;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Assembles every route, the API docs and the middleware stack.
pub fn build_router(state: AppState) -> Router {
    let merged_doc = api::openapi();

    let resource_routes = Router::new()
        .nest(
            &format!("/api/{}", state.design.schema().route),
            api::design::routes(state.design.clone()),
        )
        .nest(
            &format!("/api/{}", state.material.schema().route),
            api::material::routes(state.material.clone()),
        )
        .nest(
            &format!("/api/{}", state.size_chart.schema().route),
            api::size_chart::routes(state.size_chart.clone()),
        );

    Router::new()
        .merge(api::health::health_routes().with_state(state))
        .merge(resource_routes)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", merged_doc.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/rapidoc.json", merged_doc).path("/rapidoc"))
        .layer(from_fn(log_requests))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
