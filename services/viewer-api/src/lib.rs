//! Earth Engine viewer API.
//!
//! Browse composites of hosted satellite imagery as map tiles, store a
//! per-user boundary, and plot index time series over drawn geometries.

pub mod boundary;
pub mod config;
pub mod error;
pub mod handlers;
pub mod presenter;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Pages
        .route("/", get(handlers::home::home_handler))
        .route("/about", get(handlers::home::about_handler))
        .route(
            "/viewer",
            get(handlers::viewer::viewer_handler).post(handlers::viewer::set_boundary_handler),
        )
        // Viewer actions
        .route(
            "/viewer/get-image-collection",
            post(handlers::image_collection::image_collection_handler),
        )
        .route(
            "/viewer/get-time-series-plot",
            post(handlers::time_series::time_series_plot_handler),
        )
        // REST API
        .route(
            "/api/get-time-series",
            get(handlers::api::get_time_series_handler)
                .post(handlers::api::post_time_series_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
