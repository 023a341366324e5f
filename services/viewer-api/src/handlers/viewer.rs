//! The viewer page: control options, map framing and boundary upload.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Extension, Multipart},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use viewer_common::bbox::{MAX_ZOOM, MIN_ZOOM};
use viewer_common::{Catalog, FramingProps, Product, ProductDates, Reducer};

use crate::boundary::BoundaryError;
use crate::handlers::current_user;
use crate::state::AppState;

/// Multipart field holding the boundary archive.
pub const BOUNDARY_FIELD: &str = "boundary-file";

#[derive(Debug, Clone, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatePicker {
    pub name: &'static str,
    pub initial: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub extent: [f64; 4],
    pub center: [f64; 2],
    pub zoom: i32,
    pub min_zoom: i32,
    pub max_zoom: i32,
}

impl From<FramingProps> for MapView {
    fn from(framing: FramingProps) -> Self {
        Self {
            extent: framing.bbox,
            center: framing.centroid,
            zoom: framing.zoom,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

/// Everything the viewer page needs to render its controls.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerContext {
    pub platform_options: Vec<SelectOption>,
    pub sensor_options: Vec<SelectOption>,
    pub product_options: Vec<SelectOption>,
    pub start_date: DatePicker,
    pub end_date: DatePicker,
    pub reducer_options: Vec<SelectOption>,
    pub map_view: MapView,
    pub set_boundary_error: String,
    pub ee_products: Catalog,
}

impl ViewerContext {
    /// Controls seeded from the default platform's first sensor and product.
    pub fn build(
        catalog: &Catalog,
        today: NaiveDate,
        framing: Option<FramingProps>,
        set_boundary_error: String,
    ) -> Self {
        let platform = catalog.default_platform();
        let sensor = platform.sensors.first();
        let products: &[Product] = sensor.map(|s| s.products.as_slice()).unwrap_or(&[]);

        let dates = products
            .first()
            .map(|product| ProductDates::resolve(product, today))
            .unwrap_or(ProductDates {
                default_start: today,
                default_end: today,
                valid_start: today,
                valid_end: today,
            });

        Self {
            platform_options: catalog
                .platforms
                .iter()
                .map(|p| SelectOption {
                    label: p.display.clone(),
                    value: p.id.clone(),
                })
                .collect(),
            sensor_options: platform
                .sensors
                .iter()
                .map(|s| SelectOption {
                    label: s.display_name(),
                    value: s.id.clone(),
                })
                .collect(),
            product_options: products
                .iter()
                .map(|p| SelectOption {
                    label: p.display.clone(),
                    value: p.id.clone(),
                })
                .collect(),
            start_date: DatePicker {
                name: "start_date",
                initial: dates.default_start,
                start_date: dates.valid_start,
                end_date: dates.valid_end,
            },
            end_date: DatePicker {
                name: "end_date",
                initial: dates.default_end,
                start_date: dates.valid_start,
                end_date: dates.valid_end,
            },
            reducer_options: Reducer::ALL
                .iter()
                .map(|r| SelectOption {
                    label: r.label().to_string(),
                    value: r.as_str().to_string(),
                })
                .collect(),
            map_view: framing.unwrap_or_else(FramingProps::world).into(),
            set_boundary_error,
            ee_products: catalog.clone(),
        }
    }
}

async fn context_for(state: &AppState, user: &str, set_boundary_error: String) -> ViewerContext {
    ViewerContext::build(
        &state.catalog,
        state.today(),
        state.boundaries.framing(user).await,
        set_boundary_error,
    )
}

/// GET /viewer
pub async fn viewer_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<ViewerContext> {
    let user = current_user(&headers, &state.config);
    Json(context_for(&state, &user, String::new()).await)
}

/// POST /viewer - Set the user's boundary from an uploaded archive.
///
/// Redirects back to the viewer on success. On failure the viewer context
/// is returned with the reason in `set_boundary_error`.
pub async fn set_boundary_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let user = current_user(&headers, &state.config);

    let archive = match multipart {
        Ok(multipart) => read_boundary_field(multipart).await,
        Err(rejection) => Err(BoundaryError::BadArchive(rejection.to_string())),
    };
    let result = match archive {
        Ok(archive) => state.boundaries.upload(&user, archive).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(asset_id) => {
            info!(%user, %asset_id, "Boundary set");
            Redirect::to("/viewer").into_response()
        }
        Err(e) => {
            warn!(%user, error = ?e, "Boundary upload rejected");
            Json(context_for(&state, &user, e.to_string()).await).into_response()
        }
    }
}

async fn read_boundary_field(mut multipart: Multipart) -> Result<Vec<u8>, BoundaryError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| BoundaryError::BadArchive(e.to_string()))?;

        match field {
            Some(field) if field.name() == Some(BOUNDARY_FIELD) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| BoundaryError::BadArchive(e.to_string()))?;
                return Ok(bytes.to_vec());
            }
            Some(_) => continue,
            None => return Err(BoundaryError::BadArchive("no boundary file".to_string())),
        }
    }
}
