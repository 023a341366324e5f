//! Error responses for the JSON API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ee_client::GatewayError;
use serde_json::json;
use thiserror::Error;
use viewer_common::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            ApiError::Validation(e) => e.http_status_code(),
            ApiError::Gateway(e) => e.http_status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Validation(e) => json!({
                "error": e.to_string(),
                "rule": e.rule(),
                "field": e.field(),
            }),
            ApiError::Gateway(e) => json!({ "error": e.user_message() }),
        };
        (status, Json(body)).into_response()
    }
}
