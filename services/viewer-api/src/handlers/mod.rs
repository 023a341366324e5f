//! HTTP request handlers for the viewer API.

pub mod api;
pub mod health;
pub mod home;
pub mod image_collection;
pub mod time_series;
pub mod viewer;

use std::fmt::Display;

use axum::http::HeaderMap;
use tracing::warn;
use viewer_common::RawQuery;

use crate::config::ViewerConfig;

/// Parameters from a form or query string, or none when the extractor
/// rejected the request. Validation then reports the first missing field
/// in the endpoint's usual JSON shape.
pub fn params_or_empty<E: Display>(extracted: Result<RawQuery, E>) -> RawQuery {
    extracted.unwrap_or_else(|rejection| {
        warn!(%rejection, "Unreadable request parameters");
        RawQuery::default()
    })
}

/// The calling user, as identified by the fronting proxy.
pub fn current_user(headers: &HeaderMap, config: &ViewerConfig) -> String {
    headers
        .get(config.user_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(&config.default_user)
        .to_string()
}
