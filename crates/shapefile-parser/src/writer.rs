//! Encoding of `.shp` main files and `.shx` index files.

use crate::header::{FileHeader, ShapeType, HEADER_LEN};
use crate::records::{bbox_of, Polygon, Shape};

/// Encoded main and index files.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedShapefile {
    pub shp: Vec<u8>,
    pub shx: Vec<u8>,
}

/// Encode shapes of a single type into `.shp` and `.shx` bytes.
///
/// `Shape::Other` records are written as null shapes.
pub fn encode(shape_type: ShapeType, shapes: &[Shape]) -> EncodedShapefile {
    let mut body = Vec::new();
    let mut index = Vec::with_capacity(shapes.len() * 8);

    for (i, shape) in shapes.iter().enumerate() {
        let content = encode_shape(shape);
        let offset_words = ((HEADER_LEN + body.len()) / 2) as i32;
        let content_words = (content.len() / 2) as i32;

        body.extend_from_slice(&(i as i32 + 1).to_be_bytes());
        body.extend_from_slice(&content_words.to_be_bytes());
        body.extend_from_slice(&content);

        index.extend_from_slice(&offset_words.to_be_bytes());
        index.extend_from_slice(&content_words.to_be_bytes());
    }

    let bbox = bbox_of(shapes.iter().flat_map(shape_points));

    let shp_header = FileHeader {
        file_length: HEADER_LEN + body.len(),
        shape_type,
        bbox,
    };
    let shx_header = FileHeader {
        file_length: HEADER_LEN + index.len(),
        ..shp_header
    };

    let mut shp = shp_header.encode().to_vec();
    shp.extend_from_slice(&body);
    let mut shx = shx_header.encode().to_vec();
    shx.extend_from_slice(&index);

    EncodedShapefile { shp, shx }
}

fn shape_points(shape: &Shape) -> Box<dyn Iterator<Item = &[f64; 2]> + '_> {
    match shape {
        Shape::Point(p) => Box::new(std::iter::once(p)),
        Shape::Polygon(polygon) => Box::new(polygon.rings.iter().flatten()),
        Shape::Null | Shape::Other(_) => Box::new(std::iter::empty()),
    }
}

fn encode_shape(shape: &Shape) -> Vec<u8> {
    match shape {
        Shape::Null | Shape::Other(_) => ShapeType::Null.code().to_le_bytes().to_vec(),
        Shape::Point(p) => {
            let mut out = Vec::with_capacity(20);
            out.extend_from_slice(&ShapeType::Point.code().to_le_bytes());
            out.extend_from_slice(&p[0].to_le_bytes());
            out.extend_from_slice(&p[1].to_le_bytes());
            out
        }
        Shape::Polygon(polygon) => encode_polygon(polygon),
    }
}

fn encode_polygon(polygon: &Polygon) -> Vec<u8> {
    let num_points: usize = polygon.point_count();
    let mut out = Vec::with_capacity(44 + polygon.rings.len() * 4 + num_points * 16);

    out.extend_from_slice(&ShapeType::Polygon.code().to_le_bytes());
    for v in bbox_of(polygon.rings.iter().flatten()) {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&(polygon.rings.len() as i32).to_le_bytes());
    out.extend_from_slice(&(num_points as i32).to_le_bytes());

    let mut start = 0i32;
    for ring in &polygon.rings {
        out.extend_from_slice(&start.to_le_bytes());
        start += ring.len() as i32;
    }
    for point in polygon.rings.iter().flatten() {
        out.extend_from_slice(&point[0].to_le_bytes());
        out.extend_from_slice(&point[1].to_le_bytes());
    }
    out
}
