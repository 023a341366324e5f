//! GET/POST /api/get-time-series
//!
//! The REST flavour of the time series plot: the same parameters plus
//! `orient`, answered with the raw tables instead of a figure.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Extension, Form, Query,
    },
    Json,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::info;
use viewer_common::{DateRange, Orientation, QueryGeometry, RawQuery, Reducer, TimeSeriesQuery};

use crate::error::ApiError;
use crate::handlers::params_or_empty;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TimeSeriesResponse {
    /// One table per geometry member that could be computed.
    pub time_series: Vec<JsonValue>,
    pub parameters: Parameters,
}

/// The normalized request, defaults filled in.
#[derive(Debug, Serialize)]
pub struct Parameters {
    pub platform: String,
    pub sensor: String,
    pub product: String,
    pub index_name: String,
    #[serde(flatten)]
    pub date_range: DateRange,
    pub reducer: Reducer,
    pub scale: f64,
    pub orient: Orientation,
    pub geometry: Vec<QueryGeometry>,
}

impl From<&TimeSeriesQuery> for Parameters {
    fn from(query: &TimeSeriesQuery) -> Self {
        Self {
            platform: query.platform.clone(),
            sensor: query.sensor.clone(),
            product: query.product.id.clone(),
            index_name: query.index_name.clone(),
            date_range: query.date_range,
            reducer: query.reducer,
            scale: query.scale,
            orient: query.orient,
            geometry: query.geometry.clone(),
        }
    }
}

pub async fn get_time_series_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<RawQuery>, QueryRejection>,
) -> Result<Json<TimeSeriesResponse>, ApiError> {
    let raw = params_or_empty(query.map(|Query(raw)| raw));
    time_series(&state, &raw).await.map(Json)
}

pub async fn post_time_series_handler(
    Extension(state): Extension<Arc<AppState>>,
    form: Result<Form<RawQuery>, FormRejection>,
) -> Result<Json<TimeSeriesResponse>, ApiError> {
    let raw = params_or_empty(form.map(|Form(raw)| raw));
    time_series(&state, &raw).await.map(Json)
}

async fn time_series(state: &AppState, raw: &RawQuery) -> Result<TimeSeriesResponse, ApiError> {
    let query = state.validator().validate_time_series(raw)?;
    let series = state.gateway.time_series(&query).await?;

    info!(
        product = %query.product.id,
        series = series.len(),
        orient = %query.orient,
        "Computed time series"
    );

    Ok(TimeSeriesResponse {
        time_series: series.iter().map(|ts| ts.oriented(query.orient)).collect(),
        parameters: Parameters::from(&query),
    })
}
