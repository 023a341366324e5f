//! Shape records of the `.shp` main file.

use geo::{LineString, Winding};
use tracing::debug;

use crate::header::{read_f64_le, read_i32_be, read_i32_le, FileHeader, ShapeType, HEADER_LEN};
use crate::ShapefileError;

/// `[x, y]` coordinate pair.
pub type Point = [f64; 2];

/// A polygon record: one or more rings.
///
/// Rings are closed (first point equals last). Exterior rings wind
/// clockwise and holes counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// `[xmin, ymin, xmax, ymax]`
    pub bbox: [f64; 4],
    pub rings: Vec<Vec<Point>>,
}

impl Polygon {
    /// Build a polygon from rings, computing the bounding box.
    pub fn new(rings: Vec<Vec<Point>>) -> Self {
        let bbox = bbox_of(rings.iter().flatten());
        Self { bbox, rings }
    }

    /// Group rings into `[exterior, holes...]` polygons using winding
    /// order. A hole that precedes any exterior is treated as an exterior.
    pub fn grouped(&self) -> Vec<Vec<Vec<Point>>> {
        let mut groups: Vec<Vec<Vec<Point>>> = Vec::new();
        for ring in &self.rings {
            match groups.last_mut() {
                Some(group) if !is_clockwise(ring) => group.push(ring.clone()),
                _ => groups.push(vec![ring.clone()]),
            }
        }
        groups
    }

    pub fn point_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }
}

/// A single record's geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Null,
    Point(Point),
    Polygon(Polygon),
    /// A shape type this reader does not decode.
    Other(ShapeType),
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Null => ShapeType::Null,
            Shape::Point(_) => ShapeType::Point,
            Shape::Polygon(_) => ShapeType::Polygon,
            Shape::Other(t) => *t,
        }
    }
}

/// Parse every record following the header of a `.shp` file.
pub fn parse_records(data: &[u8], header: &FileHeader) -> Result<Vec<Shape>, ShapefileError> {
    if data.len() < header.file_length {
        return Err(ShapefileError::Truncated(format!(
            "header declares {} bytes, file has {}",
            header.file_length,
            data.len()
        )));
    }

    let mut shapes = Vec::new();
    let mut offset = HEADER_LEN;
    let end = header.file_length;

    while offset < end {
        if offset + 8 > end {
            return Err(ShapefileError::Truncated(format!(
                "record header at byte {}",
                offset
            )));
        }

        let number = read_i32_be(data, offset);
        let content_len = read_i32_be(data, offset + 4);
        if content_len < 2 {
            return Err(ShapefileError::InvalidFormat(format!(
                "record {} has content length {} words",
                number, content_len
            )));
        }
        let content_start = offset + 8;
        let content_end = content_start + content_len as usize * 2;
        if content_end > end {
            return Err(ShapefileError::Truncated(format!(
                "record {} runs past end of file",
                number
            )));
        }

        let shape = parse_shape(&data[content_start..content_end], number)?;
        if shape.shape_type() != ShapeType::Null && shape.shape_type() != header.shape_type {
            return Err(ShapefileError::InvalidFormat(format!(
                "record {} is {:?} in a {:?} file",
                number,
                shape.shape_type(),
                header.shape_type
            )));
        }
        shapes.push(shape);
        offset = content_end;
    }

    debug!(records = shapes.len(), "Parsed shapefile records");
    Ok(shapes)
}

fn parse_shape(content: &[u8], number: i32) -> Result<Shape, ShapefileError> {
    let shape_type = ShapeType::from_code(read_i32_le(content, 0))?;
    match shape_type {
        ShapeType::Null => Ok(Shape::Null),
        ShapeType::Point => {
            require(content, 20, number)?;
            Ok(Shape::Point([read_f64_le(content, 4), read_f64_le(content, 12)]))
        }
        ShapeType::Polygon => parse_polygon(content, number).map(Shape::Polygon),
        other => Ok(Shape::Other(other)),
    }
}

fn parse_polygon(content: &[u8], number: i32) -> Result<Polygon, ShapefileError> {
    require(content, 44, number)?;

    let bbox = [
        read_f64_le(content, 4),
        read_f64_le(content, 12),
        read_f64_le(content, 20),
        read_f64_le(content, 28),
    ];
    let num_parts = read_i32_le(content, 36);
    let num_points = read_i32_le(content, 40);
    if num_parts < 1 || num_points < 0 {
        return Err(ShapefileError::InvalidFormat(format!(
            "record {} has {} parts and {} points",
            number, num_parts, num_points
        )));
    }
    let (num_parts, num_points) = (num_parts as usize, num_points as usize);

    let parts_at = 44;
    let points_at = parts_at + num_parts * 4;
    require(content, points_at + num_points * 16, number)?;

    let mut starts = Vec::with_capacity(num_parts);
    for i in 0..num_parts {
        let start = read_i32_le(content, parts_at + i * 4);
        if start < 0 || start as usize >= num_points.max(1) {
            return Err(ShapefileError::InvalidFormat(format!(
                "record {} part {} starts at point {}",
                number, i, start
            )));
        }
        starts.push(start as usize);
    }
    if starts.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ShapefileError::InvalidFormat(format!(
            "record {} part offsets are not increasing",
            number
        )));
    }

    let points: Vec<Point> = (0..num_points)
        .map(|i| {
            let at = points_at + i * 16;
            [read_f64_le(content, at), read_f64_le(content, at + 8)]
        })
        .collect();

    let rings = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let stop = starts.get(i + 1).copied().unwrap_or(num_points);
            points[start..stop].to_vec()
        })
        .collect();

    Ok(Polygon { bbox, rings })
}

fn require(content: &[u8], len: usize, number: i32) -> Result<(), ShapefileError> {
    if content.len() < len {
        return Err(ShapefileError::Truncated(format!(
            "record {} needs {} bytes, has {}",
            number,
            len,
            content.len()
        )));
    }
    Ok(())
}

/// Open or degenerate rings have no winding and count as holes.
pub fn is_clockwise(ring: &[Point]) -> bool {
    LineString::from(ring.to_vec()).is_cw()
}

pub(crate) fn bbox_of<'a>(points: impl Iterator<Item = &'a Point>) -> [f64; 4] {
    let mut bbox = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    let mut any = false;
    for p in points {
        any = true;
        bbox[0] = bbox[0].min(p[0]);
        bbox[1] = bbox[1].min(p[1]);
        bbox[2] = bbox[2].max(p[0]);
        bbox[3] = bbox[3].max(p[1]);
    }
    if any {
        bbox
    } else {
        [0.0; 4]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clockwise_square() -> Vec<Point> {
        vec![[0.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 0.0], [0.0, 0.0]]
    }

    #[test]
    fn test_is_clockwise() {
        let ring = clockwise_square();
        assert!(is_clockwise(&ring));
        let mut ccw = ring;
        ccw.reverse();
        assert!(!is_clockwise(&ccw));
        assert!(!is_clockwise(&[[0.0, 0.0], [1.0, 1.0]]));
    }

    #[test]
    fn test_grouped_holes() {
        let mut hole = vec![[0.5, 0.5], [0.5, 1.0], [1.0, 1.0], [1.0, 0.5], [0.5, 0.5]];
        hole.reverse();
        let polygon = Polygon::new(vec![clockwise_square(), hole, clockwise_square()]);
        let groups = polygon.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn test_polygon_bbox() {
        let polygon = Polygon::new(vec![clockwise_square()]);
        assert_eq!(polygon.bbox, [0.0, 0.0, 2.0, 2.0]);
        assert_eq!(polygon.point_count(), 5);
    }
}
