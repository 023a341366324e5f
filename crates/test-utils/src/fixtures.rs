//! Common test fixtures for viewer tests.
//!
//! This module provides pre-defined test data that represents common
//! scenarios: query geometries, boundary polygons, date ranges and remote
//! results.

/// Common geometry definitions for testing.
pub mod geometry {
    /// Clockwise ring roughly covering Salt Lake County, Utah.
    pub fn salt_lake_ring() -> Vec<[f64; 2]> {
        vec![
            [-112.26, 40.41],
            [-112.26, 40.85],
            [-111.55, 40.85],
            [-111.55, 40.41],
            [-112.26, 40.41],
        ]
    }

    /// Clockwise ring roughly covering Utah County, Utah.
    pub fn utah_county_ring() -> Vec<[f64; 2]> {
        vec![
            [-112.21, 39.81],
            [-112.21, 40.47],
            [-111.25, 40.47],
            [-111.25, 39.81],
            [-112.21, 39.81],
        ]
    }

    /// Counter-clockwise hole inside [`salt_lake_ring`].
    pub fn salt_lake_hole() -> Vec<[f64; 2]> {
        vec![
            [-111.95, 40.70],
            [-111.85, 40.70],
            [-111.85, 40.78],
            [-111.95, 40.78],
            [-111.95, 40.70],
        ]
    }

    pub const POINT_GEOJSON: &str = r#"{"type":"Point","coordinates":[-111.89,40.76]}"#;

    pub const POLYGON_GEOJSON: &str = r#"{"type":"Polygon","coordinates":[[[-112.0,40.5],[-111.8,40.5],[-111.8,40.7],[-112.0,40.7],[-112.0,40.5]]]}"#;

    /// What the map's draw tool posts: a collection of drawn shapes.
    pub const DRAWN_COLLECTION_GEOJSON: &str = r#"{"type":"GeometryCollection","geometries":[{"type":"Point","coordinates":[-111.89,40.76]},{"type":"Polygon","coordinates":[[[-112.0,40.5],[-111.8,40.5],[-111.8,40.7],[-112.0,40.7],[-112.0,40.5]]]}]}"#;

    pub const LINESTRING_GEOJSON: &str =
        r#"{"type":"LineString","coordinates":[[-112.0,40.5],[-111.8,40.7]]}"#;
}

/// Common dates for testing.
pub mod dates {
    /// A fixed "today" for tests (2024-01-15).
    pub const REFERENCE_TODAY: &str = "2024-01-15";

    pub const JANUARY_2020_START: &str = "2020-01-01";
    pub const JANUARY_2020_END: &str = "2020-01-31";

    /// Before any MODIS product starts.
    pub const BEFORE_MODIS: &str = "1999-12-31";
}

/// Common remote results for testing.
pub mod results {
    use serde_json::{json, Value};

    /// A computed `[[time, value], ...]` array, out of order, with a gap.
    pub fn snow_cover_pairs() -> Value {
        json!([
            [1578009600000i64, 12.0],
            [1577836800000i64, 41.5],
            [1577923200000i64, null]
        ])
    }

    pub const MAP_NAME: &str = "projects/test-project/maps/abc123";
}

/// The user id used by tests that do not care which user is calling.
pub const TEST_USER: &str = "alice";
