//! The 100-byte main file header shared by `.shp` and `.shx` files.
//!
//! Layout (big-endian fields marked BE, the rest little-endian):
//!
//! | Bytes  | Field                   |
//! |--------|-------------------------|
//! | 0-3    | File code 9994 (BE)     |
//! | 4-23   | Unused                  |
//! | 24-27  | File length, words (BE) |
//! | 28-31  | Version 1000            |
//! | 32-35  | Shape type              |
//! | 36-67  | Xmin, Ymin, Xmax, Ymax  |
//! | 68-99  | Zmin, Zmax, Mmin, Mmax  |

use crate::ShapefileError;

pub const HEADER_LEN: usize = 100;
pub const FILE_CODE: i32 = 9994;
pub const VERSION: i32 = 1000;

/// Shape types defined by the shapefile format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShapeType {
    pub fn from_code(code: i32) -> Result<Self, ShapefileError> {
        Ok(match code {
            0 => ShapeType::Null,
            1 => ShapeType::Point,
            3 => ShapeType::PolyLine,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::PolyLineZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::PolyLineM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            31 => ShapeType::MultiPatch,
            other => return Err(ShapefileError::UnknownShapeType(other)),
        })
    }

    pub fn code(&self) -> i32 {
        match self {
            ShapeType::Null => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PolygonZ => 15,
            ShapeType::MultiPointZ => 18,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
            ShapeType::PolygonM => 25,
            ShapeType::MultiPointM => 28,
            ShapeType::MultiPatch => 31,
        }
    }
}

/// Parsed main file header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileHeader {
    /// Total file length in bytes (stored as 16-bit words).
    pub file_length: usize,
    pub shape_type: ShapeType,
    /// `[xmin, ymin, xmax, ymax]`
    pub bbox: [f64; 4],
}

impl FileHeader {
    pub fn parse(data: &[u8]) -> Result<Self, ShapefileError> {
        if data.len() < HEADER_LEN {
            return Err(ShapefileError::Truncated(format!(
                "header needs {} bytes, got {}",
                HEADER_LEN,
                data.len()
            )));
        }

        let file_code = read_i32_be(data, 0);
        if file_code != FILE_CODE {
            return Err(ShapefileError::InvalidFormat(format!(
                "bad file code {}, expected {}",
                file_code, FILE_CODE
            )));
        }

        let version = read_i32_le(data, 28);
        if version != VERSION {
            return Err(ShapefileError::InvalidFormat(format!(
                "unsupported version {}",
                version
            )));
        }

        let words = read_i32_be(data, 24);
        if words < (HEADER_LEN / 2) as i32 {
            return Err(ShapefileError::InvalidFormat(format!(
                "file length {} words is shorter than the header",
                words
            )));
        }

        Ok(Self {
            file_length: words as usize * 2,
            shape_type: ShapeType::from_code(read_i32_le(data, 32))?,
            bbox: [
                read_f64_le(data, 36),
                read_f64_le(data, 44),
                read_f64_le(data, 52),
                read_f64_le(data, 60),
            ],
        })
    }

    /// Encode the header for a file of `file_length` bytes.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&FILE_CODE.to_be_bytes());
        out[24..28].copy_from_slice(&((self.file_length / 2) as i32).to_be_bytes());
        out[28..32].copy_from_slice(&VERSION.to_le_bytes());
        out[32..36].copy_from_slice(&self.shape_type.code().to_le_bytes());
        for (i, v) in self.bbox.iter().enumerate() {
            let at = 36 + i * 8;
            out[at..at + 8].copy_from_slice(&v.to_le_bytes());
        }
        out
    }
}

pub(crate) fn read_i32_be(data: &[u8], at: usize) -> i32 {
    i32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

pub(crate) fn read_i32_le(data: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

pub(crate) fn read_f64_le(data: &[u8], at: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[at..at + 8]);
    f64::from_le_bytes(buf)
}
