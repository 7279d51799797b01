use std::sync::Arc;

use crate::db::schema::{DESIGN_REQUESTS, MATERIAL_REQUESTS, SIZE_CHART_REQUESTS};
use crate::db::service::ResourceService;
use crate::db::store::RecordStore;

/// Explicitly constructed handles shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub design: ResourceService,
    pub material: ResourceService,
    pub size_chart: ResourceService,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            design: ResourceService::new(&DESIGN_REQUESTS, store.clone()),
            material: ResourceService::new(&MATERIAL_REQUESTS, store.clone()),
            size_chart: ResourceService::new(&SIZE_CHART_REQUESTS, store.clone()),
            store,
        }
    }

    pub fn services(&self) -> [&ResourceService; 3] {
        [&self.design, &self.material, &self.size_chart]
    }
}
