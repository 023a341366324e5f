//! Common types shared by the Earth Engine viewer crates.
//!
//! - [`catalog`]: the immutable product catalog
//! - [`dates`]: default and valid date ranges per product
//! - [`validation`]: fail-fast request validation
//! - [`bbox`]: bounding boxes and map framing

pub mod bbox;
pub mod catalog;
pub mod dates;
pub mod error;
pub mod geometry;
pub mod reducer;
pub mod validation;

pub use bbox::{BoundingBox, FramingProps};
pub use catalog::{Catalog, CloudMask, Platform, Product, Sensor, VisParams};
pub use dates::{DateRange, ProductDates};
pub use error::CatalogError;
pub use geometry::{parse_geometry, GeometryError, Position, QueryGeometry, Ring};
pub use reducer::{Orientation, Reducer};
pub use validation::{CompositeQuery, RawQuery, TimeSeriesQuery, ValidationError, Validator};
