//! POST /viewer/get-image-collection

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Extension, Form},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use tracing::debug;
use viewer_common::RawQuery;

use crate::error::ApiError;
use crate::handlers::{current_user, params_or_empty};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ImageCollectionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build a composite tile layer for the posted form, clipped to the
/// caller's boundary when they have one.
pub async fn image_collection_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<RawQuery>, FormRejection>,
) -> Json<ImageCollectionResponse> {
    let raw = params_or_empty(form.map(|Form(raw)| raw));
    debug!(?raw, "Image collection request");
    let user = current_user(&headers, &state.config);

    Json(match tile_url(&state, &raw, &user).await {
        Ok(url) => ImageCollectionResponse {
            success: true,
            url: Some(url),
            error: None,
        },
        Err(e) => ImageCollectionResponse {
            success: false,
            url: None,
            error: Some(format!("Error Processing Request: {}", user_message(&e))),
        },
    })
}

async fn tile_url(state: &AppState, raw: &RawQuery, user: &str) -> Result<String, ApiError> {
    let query = state.validator().validate_composite(raw)?;
    Ok(state.gateway.tile_url(&query, Some(user)).await?)
}

/// Validation messages are shown as is; remote failures only generically.
pub fn user_message(error: &ApiError) -> String {
    match error {
        ApiError::Validation(e) => e.to_string(),
        ApiError::Gateway(e) => e.user_message().to_string(),
    }
}
