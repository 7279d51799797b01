pub mod health;
pub mod resources;

pub use resources::{design, material, size_chart};

use utoipa::OpenApi;

/// Merged OpenAPI document for all three request APIs.
pub fn openapi() -> utoipa::openapi::OpenApi {
    design::Doc::openapi()
        .merge_from(material::Doc::openapi())
        .merge_from(size_chart::Doc::openapi())
}
