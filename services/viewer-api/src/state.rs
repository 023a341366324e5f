//! Application state for the viewer API.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ee_client::{EarthEngineApi, ImageryGateway};
use viewer_common::{Catalog, Validator};

use crate::boundary::BoundaryStore;
use crate::config::ViewerConfig;

/// Shared application state.
pub struct AppState {
    /// Product catalog, loaded once at startup.
    pub catalog: Arc<Catalog>,

    /// Earth Engine operations used by the handlers.
    pub gateway: Arc<ImageryGateway>,

    /// Per-user uploaded boundaries.
    pub boundaries: BoundaryStore,

    pub config: ViewerConfig,
}

impl AppState {
    pub fn new(config: ViewerConfig, catalog: Catalog, api: Arc<dyn EarthEngineApi>) -> Self {
        let gateway = Arc::new(ImageryGateway::new(api, config.asset_root.clone()));
        let boundaries = BoundaryStore::new(config.workspace_dir.clone(), gateway.clone());

        Self {
            catalog: Arc::new(catalog),
            gateway,
            boundaries,
            config,
        }
    }

    /// The current UTC date, which bounds every product's valid range.
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    pub fn validator(&self) -> Validator<'_> {
        Validator::new(&self.catalog, self.today())
    }
}
