//! POST /viewer/get-time-series-plot

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Extension, Form},
    Json,
};
use serde::Serialize;
use tracing::debug;
use viewer_common::RawQuery;

use crate::error::ApiError;
use crate::handlers::image_collection::user_message;
use crate::handlers::params_or_empty;
use crate::presenter::{generate_figure, Figure};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PlotResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Plot the index time series over the drawn geometry, titled with the
/// product's display name.
pub async fn time_series_plot_handler(
    Extension(state): Extension<Arc<AppState>>,
    form: Result<Form<RawQuery>, FormRejection>,
) -> Json<PlotResponse> {
    let raw = params_or_empty(form.map(|Form(raw)| raw));
    debug!(?raw, "Time series plot request");

    Json(match plot(&state, &raw).await {
        Ok(figure) => PlotResponse {
            success: true,
            plot: Some(figure),
            error: None,
        },
        Err(e) => PlotResponse {
            success: false,
            plot: None,
            error: Some(user_message(&e)),
        },
    })
}

async fn plot(state: &AppState, raw: &RawQuery) -> Result<Figure, ApiError> {
    let query = state.validator().validate_time_series(raw)?;
    let series = state.gateway.time_series(&query).await?;
    Ok(generate_figure(&query.product.display, &series))
}
