//! Pure Rust reader and writer for ESRI shapefiles.
//!
//! A shapefile is a set of sibling files sharing a stem: the `.shp` main
//! file with geometry, the `.shx` index with record offsets and the `.dbf`
//! attribute table. All three are required; a `.prj` projection file is
//! carried along when present.
//!
//! Only null, point and polygon records are decoded. Other shape types are
//! recognised so callers can reject them by type.

pub mod dbf;
pub mod header;
pub mod records;
pub mod writer;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use dbf::{DbfField, DbfHeader};
pub use header::{FileHeader, ShapeType};
pub use records::{Point, Polygon, Shape};
pub use writer::EncodedShapefile;

/// Errors raised while reading a shapefile.
#[derive(Debug, Error)]
pub enum ShapefileError {
    #[error("Missing {0} file")]
    MissingComponent(&'static str),

    #[error("Truncated shapefile: {0}")]
    Truncated(String),

    #[error("Invalid shapefile: {0}")]
    InvalidFormat(String),

    #[error("Unknown shape type code {0}")]
    UnknownShapeType(i32),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A fully read shapefile.
#[derive(Debug, Clone)]
pub struct Shapefile {
    pub header: FileHeader,
    pub shapes: Vec<Shape>,
    pub attributes: DbfHeader,
    /// Raw `.dbf` bytes, kept so the table can be rewritten unchanged.
    pub dbf: Vec<u8>,
    /// Contents of the `.prj` file, if any.
    pub prj: Option<Vec<u8>>,
}

impl Shapefile {
    /// Read the shapefile whose main file is at `shp_path`.
    pub fn read(shp_path: &Path) -> Result<Self, ShapefileError> {
        let shp = read_file(shp_path)?;
        let shx_path = sibling(shp_path, "shx").ok_or(ShapefileError::MissingComponent(".shx"))?;
        let dbf_path = sibling(shp_path, "dbf").ok_or(ShapefileError::MissingComponent(".dbf"))?;
        let shx = read_file(&shx_path)?;
        let dbf = read_file(&dbf_path)?;
        let prj = match sibling(shp_path, "prj") {
            Some(path) => Some(read_file(&path)?),
            None => None,
        };

        let mut shapefile = Self::from_bytes(&shp, &shx, dbf)?;
        shapefile.prj = prj;
        Ok(shapefile)
    }

    /// Parse a shapefile from the bytes of its components.
    pub fn from_bytes(shp: &[u8], shx: &[u8], dbf: Vec<u8>) -> Result<Self, ShapefileError> {
        let header = FileHeader::parse(shp)?;
        let shapes = records::parse_records(shp, &header)?;

        let index = FileHeader::parse(shx)?;
        if index.shape_type != header.shape_type {
            return Err(ShapefileError::InvalidFormat(
                "index and main file disagree on shape type".to_string(),
            ));
        }
        let indexed = (index.file_length - header::HEADER_LEN) / 8;
        if indexed != shapes.len() || shx.len() < index.file_length {
            return Err(ShapefileError::InvalidFormat(format!(
                "index lists {} records, main file has {}",
                indexed,
                shapes.len()
            )));
        }

        let attributes = DbfHeader::parse(&dbf)?;
        if attributes.record_count != shapes.len() {
            return Err(ShapefileError::InvalidFormat(format!(
                "attribute table has {} records, main file has {}",
                attributes.record_count,
                shapes.len()
            )));
        }

        debug!(
            shape_type = ?header.shape_type,
            records = shapes.len(),
            fields = attributes.fields.len(),
            "Read shapefile"
        );

        Ok(Self {
            header,
            shapes,
            attributes,
            dbf,
            prj: None,
        })
    }

    pub fn shape_type(&self) -> ShapeType {
        self.header.shape_type
    }

    /// Polygon records, skipping null shapes.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Polygon(polygon) => Some(polygon),
            _ => None,
        })
    }

    /// Write this shapefile as `<dir>/<stem>.{shp,shx,dbf[,prj]}`.
    ///
    /// Geometry is re-encoded; the attribute table and projection are
    /// copied verbatim. Returns the path of the `.shp` file.
    pub fn write(&self, dir: &Path, stem: &str) -> Result<PathBuf, ShapefileError> {
        let encoded = writer::encode(self.header.shape_type, &self.shapes);
        let shp_path = dir.join(format!("{}.shp", stem));

        write_file(&shp_path, &encoded.shp)?;
        write_file(&dir.join(format!("{}.shx", stem)), &encoded.shx)?;
        write_file(&dir.join(format!("{}.dbf", stem)), &self.dbf)?;
        if let Some(prj) = &self.prj {
            write_file(&dir.join(format!("{}.prj", stem)), prj)?;
        }

        Ok(shp_path)
    }
}

/// Find a sibling component, accepting either extension case.
fn sibling(shp_path: &Path, ext: &str) -> Option<PathBuf> {
    [ext.to_string(), ext.to_uppercase()]
        .into_iter()
        .map(|e| shp_path.with_extension(e))
        .find(|p| p.is_file())
}

fn read_file(path: &Path) -> Result<Vec<u8>, ShapefileError> {
    std::fs::read(path).map_err(|e| ShapefileError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), ShapefileError> {
    std::fs::write(path, data).map_err(|e| ShapefileError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
