//! Plot figures for time series results.
//!
//! Figures serialize to the JSON layout the map page hands straight to
//! Plotly: `{"data": [traces...], "layout": {...}}`.

use chrono::{DateTime, SecondsFormat};
use ee_client::TimeSeries;
use serde::Serialize;

const NO_DATA_TITLE: &str = "No Data";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub mode: &'static str,
    pub name: String,
    /// RFC 3339 UTC timestamps.
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub yaxis: Axis,
    pub legend: Legend,
    pub margin: Margin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub pad: Pad,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pad {
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

/// One line trace per series. Traces are numbered when there is more
/// than one, in the order the geometries were drawn.
pub fn generate_figure(title: &str, series: &[TimeSeries]) -> Figure {
    let numbered = series.len() > 1;

    let data = series
        .iter()
        .enumerate()
        .map(|(i, ts)| Trace {
            trace_type: "scatter",
            mode: "lines",
            name: if numbered {
                format!("{} {}", ts.column, i + 1)
            } else {
                ts.column.clone()
            },
            x: ts.points.iter().map(|p| format_timestamp(p.time_ms)).collect(),
            y: ts.points.iter().map(|p| p.value).collect(),
        })
        .collect();

    let yaxis_title = series
        .last()
        .map(|ts| ts.column.clone())
        .unwrap_or_else(|| NO_DATA_TITLE.to_string());

    Figure {
        data,
        layout: Layout {
            title: Title {
                text: title.to_string(),
                pad: Pad { b: 5 },
            },
            yaxis: Axis { title: yaxis_title },
            legend: Legend { orientation: "h" },
            margin: Margin {
                l: 40,
                r: 10,
                t: 80,
                b: 10,
            },
        },
    }
}

fn format_timestamp(time_ms: i64) -> String {
    DateTime::from_timestamp_millis(time_ms)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}
