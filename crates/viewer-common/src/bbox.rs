//! Bounding boxes and map framing for stored boundaries.

use geo::{BoundingRect, Centroid, LineString, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::geometry::{Position, Ring};

/// Slope of the empirical diagonal-to-zoom fit.
pub const ZOOM_SLOPE: f64 = -0.0701;

/// Intercept of the empirical diagonal-to-zoom fit.
pub const ZOOM_INTERCEPT: f64 = 8.34;

/// Zoom limits of the viewer map.
pub const MIN_ZOOM: i32 = 2;
pub const MAX_ZOOM: i32 = 18;

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The whole world, used when a user has no boundary.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Length of the diagonal in degrees.
    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    pub fn center(&self) -> Position {
        [
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        ]
    }

    /// `[min_x, min_y, max_x, max_y]`, the extent order map controls expect.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// Map framing derived from a user's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramingProps {
    pub bbox: [f64; 4],
    pub centroid: Position,
    pub zoom: i32,
}

impl FramingProps {
    /// Framing for the whole world.
    pub fn world() -> Self {
        Self {
            bbox: BoundingBox::world().to_array(),
            centroid: [0.0, 0.0],
            zoom: 3,
        }
    }

    /// Frame a set of polygons, each given as exterior ring then holes.
    pub fn from_polygons(polygons: &[Vec<Ring>]) -> Option<Self> {
        let shapes = to_multi_polygon(polygons);
        let bbox = BoundingBox::from(shapes.bounding_rect()?);

        let centroid = shapes
            .centroid()
            .map(|c| [c.x(), c.y()])
            .unwrap_or_else(|| bbox.center());

        Some(Self {
            bbox: bbox.to_array(),
            centroid,
            zoom: zoom_for_diagonal(bbox.diagonal()),
        })
    }
}

/// Heuristic zoom level for a bounding box diagonal in degrees.
///
/// Linear fit calibrated against two reference regions; not projection
/// aware. Clamped to the map's zoom limits.
pub fn zoom_for_diagonal(diagonal: f64) -> i32 {
    let zoom = (ZOOM_SLOPE * diagonal + ZOOM_INTERCEPT).round() as i32;
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Exterior ring then holes per polygon. Empty groups are skipped.
fn to_multi_polygon(polygons: &[Vec<Ring>]) -> MultiPolygon<f64> {
    polygons
        .iter()
        .filter_map(|rings| {
            let (exterior, holes) = rings.split_first()?;
            Some(Polygon::new(
                LineString::from(exterior.clone()),
                holes.iter().cloned().map(LineString::from).collect(),
            ))
        })
        .collect()
}
