//! Landing and about pages.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::state::AppState;

pub const APP_NAME: &str = "Earth Engine";

#[derive(Debug, Serialize)]
pub struct Link {
    pub href: &'static str,
    pub rel: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub name: &'static str,
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize)]
pub struct PlatformSummary {
    pub id: String,
    pub display: String,
    pub sensors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AboutResponse {
    pub name: &'static str,
    pub description: &'static str,
    pub platforms: Vec<PlatformSummary>,
}

/// GET /
pub async fn home_handler() -> Json<LandingResponse> {
    Json(LandingResponse {
        name: APP_NAME,
        links: vec![
            Link {
                href: "/viewer",
                rel: "viewer",
                title: "Browse imagery and plot time series",
            },
            Link {
                href: "/about",
                rel: "about",
                title: "About this application",
            },
            Link {
                href: "/api/get-time-series",
                rel: "service",
                title: "Time series REST API",
            },
        ],
    })
}

/// GET /about
pub async fn about_handler(Extension(state): Extension<Arc<AppState>>) -> Json<AboutResponse> {
    let platforms = state
        .catalog
        .platforms
        .iter()
        .map(|platform| PlatformSummary {
            id: platform.id.clone(),
            display: platform.display.clone(),
            sensors: platform.sensors.iter().map(|s| s.display_name()).collect(),
        })
        .collect();

    Json(AboutResponse {
        name: APP_NAME,
        description: "Visualize composites of Google Earth Engine image collections \
                      and plot time series of their indices over areas you draw.",
        platforms,
    })
}
