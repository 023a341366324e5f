//! Area-of-interest geometries accepted by time series queries.

use geojson::{GeoJson, Geometry, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `[lon, lat]` pair in geographic coordinates.
pub type Position = [f64; 2];

/// A linear ring of positions.
pub type Ring = Vec<Position>;

/// A single member of a query geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum QueryGeometry {
    Point(Position),
    /// Exterior ring first, holes after.
    Polygon(Vec<Ring>),
}

impl QueryGeometry {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryGeometry::Point(_) => "Point",
            QueryGeometry::Polygon(_) => "Polygon",
        }
    }

    pub fn to_geojson(&self) -> Geometry {
        match self {
            QueryGeometry::Point(p) => Geometry::new(Value::Point(p.to_vec())),
            QueryGeometry::Polygon(rings) => Geometry::new(Value::Polygon(
                rings
                    .iter()
                    .map(|ring| ring.iter().map(|p| p.to_vec()).collect())
                    .collect(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Geometry is not valid GeoJSON: {0}")]
    InvalidJson(String),

    #[error("Geometry contains no shapes")]
    Empty,

    #[error("Only Points and Polygons are supported, found {0}")]
    UnsupportedType(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Parse a GeoJSON document into its point and polygon members.
///
/// Accepts a bare geometry, a geometry collection (what the map draw tool
/// emits), a feature or a feature collection. Nested collections are
/// flattened in document order.
pub fn parse_geometry(s: &str) -> Result<Vec<QueryGeometry>, GeometryError> {
    let geojson: GeoJson = s
        .parse()
        .map_err(|e: geojson::Error| GeometryError::InvalidJson(e.to_string()))?;

    let mut members = Vec::new();
    match geojson {
        GeoJson::Geometry(geometry) => collect(&geometry, &mut members)?,
        GeoJson::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                collect(geometry, &mut members)?;
            }
        }
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(geometry) = &feature.geometry {
                    collect(geometry, &mut members)?;
                }
            }
        }
    }

    if members.is_empty() {
        return Err(GeometryError::Empty);
    }

    Ok(members)
}

fn collect(geometry: &Geometry, out: &mut Vec<QueryGeometry>) -> Result<(), GeometryError> {
    match &geometry.value {
        Value::Point(coords) => out.push(QueryGeometry::Point(position(coords)?)),
        Value::Polygon(rings) => {
            let rings = rings
                .iter()
                .map(|ring| ring.iter().map(|c| position(c)).collect::<Result<Ring, _>>())
                .collect::<Result<Vec<_>, _>>()?;
            if rings.first().map_or(true, |r| r.len() < 4) {
                return Err(GeometryError::InvalidCoordinates(
                    "polygon exterior ring needs at least four positions".to_string(),
                ));
            }
            out.push(QueryGeometry::Polygon(rings));
        }
        Value::GeometryCollection(geometries) => {
            for member in geometries {
                collect(member, out)?;
            }
        }
        other => return Err(GeometryError::UnsupportedType(type_name(other).to_string())),
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn position(coords: &[f64]) -> Result<Position, GeometryError> {
    match coords {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => {
            if !(-180.0..=180.0).contains(lon) || !(-90.0..=90.0).contains(lat) {
                return Err(GeometryError::InvalidCoordinates(format!(
                    "[{}, {}] is outside geographic bounds",
                    lon, lat
                )));
            }
            Ok([*lon, *lat])
        }
        _ => Err(GeometryError::InvalidCoordinates(format!("{:?}", coords))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geometry_collection() {
        let json = r#"{"type":"GeometryCollection","geometries":[
            {"type":"Point","coordinates":[-111.9,40.7]},
            {"type":"Polygon","coordinates":[[[-112,40],[-111,40],[-111,41],[-112,40]]]}
        ]}"#;
        let members = parse_geometry(json).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0], QueryGeometry::Point([-111.9, 40.7]));
        assert_eq!(members[1].kind(), "Polygon");
    }

    #[test]
    fn test_parse_bare_point() {
        let members = parse_geometry(r#"{"type":"Point","coordinates":[10.0,20.0]}"#).unwrap();
        assert_eq!(members, vec![QueryGeometry::Point([10.0, 20.0])]);
    }

    #[test]
    fn test_parse_feature_collection() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1,2]}},
            {"type":"Feature","properties":{},"geometry":null}
        ]}"#;
        assert_eq!(parse_geometry(json).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_collection_rejected() {
        let json = r#"{"type":"GeometryCollection","geometries":[]}"#;
        assert_eq!(parse_geometry(json), Err(GeometryError::Empty));
    }

    #[test]
    fn test_linestring_rejected() {
        let json = r#"{"type":"LineString","coordinates":[[0,0],[1,1]]}"#;
        assert!(matches!(
            parse_geometry(json),
            Err(GeometryError::UnsupportedType(t)) if t == "LineString"
        ));
    }

    #[test]
    fn test_not_json_rejected() {
        assert!(matches!(
            parse_geometry("draw something"),
            Err(GeometryError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_out_of_bounds_point_rejected() {
        let json = r#"{"type":"Point","coordinates":[200.0,20.0]}"#;
        assert!(matches!(
            parse_geometry(json),
            Err(GeometryError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_to_geojson_roundtrip() {
        let polygon = QueryGeometry::Polygon(vec![vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 0.0],
        ]]);
        let json = serde_json::to_string(&polygon.to_geojson()).unwrap();
        assert_eq!(parse_geometry(&json).unwrap(), vec![polygon]);
    }
}
