//! Request validation.
//!
//! Raw form or query-string parameters are checked against the product
//! catalog in a fixed order, stopping at the first violation. Each rule has
//! its own error variant so callers can report the offending field and a
//! message the user can act on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, Product};
use crate::dates::{format_date, parse_date, DateRange, ProductDates};
use crate::geometry::{parse_geometry, GeometryError, QueryGeometry};
use crate::reducer::{Orientation, Reducer};

/// Scale in meters used when the request does not name one.
pub const DEFAULT_SCALE: f64 = 250.0;

/// Parameters as they arrive from a form or query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuery {
    pub platform: Option<String>,
    pub sensor: Option<String>,
    pub product: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reducer: Option<String>,
    pub index_name: Option<String>,
    pub scale: Option<String>,
    pub geometry: Option<String>,
    pub orient: Option<String>,
}

/// A validated request for a composite tile layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeQuery {
    pub platform: String,
    pub sensor: String,
    pub product: Product,
    pub date_range: DateRange,
    pub reducer: Reducer,
}

/// A validated request for a time series over one or more geometries.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesQuery {
    pub platform: String,
    pub sensor: String,
    pub product: Product,
    pub index_name: String,
    pub date_range: DateRange,
    pub reducer: Reducer,
    pub geometry: Vec<QueryGeometry>,
    pub scale: f64,
    pub orient: Orientation,
}

/// The rule a request violated, in evaluation order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Unknown sensor '{sensor}' for platform '{platform}'")]
    UnknownSensor { platform: String, sensor: String },

    #[error("Unknown product '{product}' for {platform} {sensor}")]
    UnknownProduct {
        platform: String,
        sensor: String,
        product: String,
    },

    #[error("We're sorry, but plotting {display} is not supported at this time. Please select a different product.")]
    IndexNotSupported { display: String },

    #[error("Invalid {field}: '{value}'. Expected a date formatted YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} {date} is outside the valid range for this product ({valid_start} to {valid_end})")]
    DateOutOfRange {
        field: &'static str,
        date: String,
        valid_start: String,
        valid_end: String,
    },

    #[error("Start date {start} is after end date {end}")]
    StartAfterEnd { start: String, end: String },

    #[error("Unknown reducer '{0}'. Expected one of: median, mosaic, mode, mean, min, max, sum, count, product")]
    UnknownReducer(String),

    #[error("Unknown orient '{0}'. Expected one of: dict, list, split, records, index")]
    UnknownOrientation(String),

    #[error("Invalid scale '{0}'. Expected a positive number of meters")]
    InvalidScale(String),

    #[error("Please draw an area of interest. {0}")]
    InvalidGeometry(GeometryError),

    #[error("Please draw an area of interest.")]
    MissingGeometry,
}

impl ValidationError {
    /// Stable identifier of the violated rule.
    pub fn rule(&self) -> &'static str {
        match self {
            ValidationError::UnknownPlatform(_) => "unknown_platform",
            ValidationError::UnknownSensor { .. } => "unknown_sensor",
            ValidationError::UnknownProduct { .. } => "unknown_product",
            ValidationError::IndexNotSupported { .. } => "index_not_supported",
            ValidationError::InvalidDate { .. } => "invalid_date",
            ValidationError::DateOutOfRange { .. } => "date_out_of_range",
            ValidationError::StartAfterEnd { .. } => "start_after_end",
            ValidationError::UnknownReducer(_) => "unknown_reducer",
            ValidationError::UnknownOrientation(_) => "unknown_orient",
            ValidationError::InvalidScale(_) => "invalid_scale",
            ValidationError::InvalidGeometry(_) | ValidationError::MissingGeometry => {
                "invalid_geometry"
            }
        }
    }

    /// The request parameter at fault.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::UnknownPlatform(_) => "platform",
            ValidationError::UnknownSensor { .. } => "sensor",
            ValidationError::UnknownProduct { .. } => "product",
            ValidationError::IndexNotSupported { .. } => "index_name",
            ValidationError::InvalidDate { field, .. } => *field,
            ValidationError::DateOutOfRange { field, .. } => *field,
            ValidationError::StartAfterEnd { .. } => "start_date",
            ValidationError::UnknownReducer(_) => "reducer",
            ValidationError::UnknownOrientation(_) => "orient",
            ValidationError::InvalidScale(_) => "scale",
            ValidationError::InvalidGeometry(_) | ValidationError::MissingGeometry => "geometry",
        }
    }

    /// HTTP status for this error. Every rule is a client error.
    pub fn http_status_code(&self) -> u16 {
        400
    }
}

/// Validates raw requests against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    catalog: &'a Catalog,
    today: NaiveDate,
}

struct Resolved<'a> {
    platform: String,
    sensor: String,
    product: &'a Product,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a Catalog, today: NaiveDate) -> Self {
        Self { catalog, today }
    }

    /// Validate a composite tile request.
    pub fn validate_composite(&self, raw: &RawQuery) -> Result<CompositeQuery, ValidationError> {
        let resolved = self.resolve_product(raw)?;
        let date_range = self.check_dates(raw, resolved.product)?;
        let reducer = check_reducer(raw)?;

        Ok(CompositeQuery {
            platform: resolved.platform,
            sensor: resolved.sensor,
            product: resolved.product.clone(),
            date_range,
            reducer,
        })
    }

    /// Validate a time series request.
    pub fn validate_time_series(
        &self,
        raw: &RawQuery,
    ) -> Result<TimeSeriesQuery, ValidationError> {
        let resolved = self.resolve_product(raw)?;

        let index_name = non_empty(&raw.index_name)
            .map(str::to_string)
            .or_else(|| resolved.product.index.clone())
            .ok_or_else(|| ValidationError::IndexNotSupported {
                display: resolved.product.display.clone(),
            })?;

        let date_range = self.check_dates(raw, resolved.product)?;
        let reducer = check_reducer(raw)?;

        let orient = match non_empty(&raw.orient) {
            None => Orientation::default(),
            Some(s) => s
                .parse::<Orientation>()
                .map_err(|_| ValidationError::UnknownOrientation(s.to_string()))?,
        };

        let scale = match non_empty(&raw.scale) {
            None => DEFAULT_SCALE,
            Some(s) => match s.parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => v,
                _ => return Err(ValidationError::InvalidScale(s.to_string())),
            },
        };

        let geometry = match non_empty(&raw.geometry) {
            None => return Err(ValidationError::MissingGeometry),
            Some(s) => parse_geometry(s).map_err(ValidationError::InvalidGeometry)?,
        };

        Ok(TimeSeriesQuery {
            platform: resolved.platform,
            sensor: resolved.sensor,
            product: resolved.product.clone(),
            index_name,
            date_range,
            reducer,
            geometry,
            scale,
            orient,
        })
    }

    fn resolve_product(&self, raw: &RawQuery) -> Result<Resolved<'a>, ValidationError> {
        let platform_id = non_empty(&raw.platform).unwrap_or_default();
        let platform = self
            .catalog
            .platform(platform_id)
            .ok_or_else(|| ValidationError::UnknownPlatform(platform_id.to_string()))?;

        let sensor_id = non_empty(&raw.sensor).unwrap_or_default();
        let sensor = platform
            .sensors
            .iter()
            .find(|s| s.id == sensor_id)
            .ok_or_else(|| ValidationError::UnknownSensor {
                platform: platform.id.clone(),
                sensor: sensor_id.to_string(),
            })?;

        let product_id = non_empty(&raw.product).unwrap_or_default();
        let product = sensor
            .products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ValidationError::UnknownProduct {
                platform: platform.id.clone(),
                sensor: sensor.id.clone(),
                product: product_id.to_string(),
            })?;

        Ok(Resolved {
            platform: platform.id.clone(),
            sensor: sensor.id.clone(),
            product,
        })
    }

    fn check_dates(&self, raw: &RawQuery, product: &Product) -> Result<DateRange, ValidationError> {
        let dates = ProductDates::resolve(product, self.today);

        let start = parse_or_default(&raw.start_date, "start_date", dates.default_start)?;
        let end = parse_or_default(&raw.end_date, "end_date", dates.default_end)?;

        for (field, date) in [("start_date", start), ("end_date", end)] {
            if !dates.contains(date) {
                return Err(ValidationError::DateOutOfRange {
                    field,
                    date: format_date(date),
                    valid_start: format_date(dates.valid_start),
                    valid_end: format_date(dates.valid_end),
                });
            }
        }

        if start > end {
            return Err(ValidationError::StartAfterEnd {
                start: format_date(start),
                end: format_date(end),
            });
        }

        Ok(DateRange::new(start, end))
    }
}

fn check_reducer(raw: &RawQuery) -> Result<Reducer, ValidationError> {
    match non_empty(&raw.reducer) {
        None => Ok(Reducer::default()),
        Some(s) => s
            .parse()
            .map_err(|_| ValidationError::UnknownReducer(s.to_string())),
    }
}

fn parse_or_default(
    value: &Option<String>,
    field: &'static str,
    default: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    match non_empty(value) {
        None => Ok(default),
        Some(s) => parse_date(s).ok_or_else(|| ValidationError::InvalidDate {
            field,
            value: s.to_string(),
        }),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
