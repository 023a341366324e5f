//! Zip archive builders for boundary upload tests.
//!
//! Archives are built in memory from shapes, so tests never depend on
//! binary files checked into the repository.

use std::io::{Cursor, Write};

use shapefile_parser::dbf::{write_dbf, DbfField};
use shapefile_parser::{writer, Polygon, Shape, ShapeType};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::fixtures::geometry;

pub const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// Zip the given `(path, contents)` entries.
pub fn zip_entries<S: AsRef<str>>(entries: &[(S, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        zip.start_file(name.as_ref(), options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// The `.shp`, `.shx`, `.dbf` and `.prj` files of a shapefile named
/// `<stem>`, one `ID` attribute per shape.
pub fn shapefile_entries(
    stem: &str,
    shape_type: ShapeType,
    shapes: &[Shape],
) -> Vec<(String, Vec<u8>)> {
    let encoded = writer::encode(shape_type, shapes);
    let records: Vec<Vec<String>> = (1..=shapes.len()).map(|i| vec![i.to_string()]).collect();
    let dbf = write_dbf(&[DbfField::numeric("ID", 9, 0)], &records);

    vec![
        (format!("{}.shp", stem), encoded.shp),
        (format!("{}.shx", stem), encoded.shx),
        (format!("{}.dbf", stem), dbf),
        (format!("{}.prj", stem), WGS84_PRJ.as_bytes().to_vec()),
    ]
}

pub fn county_polygons() -> Vec<Shape> {
    vec![
        Shape::Polygon(Polygon::new(vec![
            geometry::salt_lake_ring(),
            geometry::salt_lake_hole(),
        ])),
        Shape::Polygon(Polygon::new(vec![geometry::utah_county_ring()])),
    ]
}

/// A valid archive holding a two-record polygon shapefile.
pub fn polygon_shapefile_zip() -> Vec<u8> {
    zip_entries(&shapefile_entries(
        "counties",
        ShapeType::Polygon,
        &county_polygons(),
    ))
}

/// A polygon shapefile inside a nested folder, as archives made by
/// desktop zip tools often are.
pub fn nested_polygon_shapefile_zip() -> Vec<u8> {
    let entries: Vec<(String, Vec<u8>)> =
        shapefile_entries("counties", ShapeType::Polygon, &county_polygons())
            .into_iter()
            .map(|(name, data)| (format!("export/data/{}", name), data))
            .collect();
    zip_entries(&entries)
}

/// A valid archive holding a point shapefile.
pub fn point_shapefile_zip() -> Vec<u8> {
    let shapes = vec![Shape::Point([-111.89, 40.76]), Shape::Point([-111.66, 40.23])];
    zip_entries(&shapefile_entries("sites", ShapeType::Point, &shapes))
}

/// A polygon shapefile with one sidecar removed.
pub fn shapefile_zip_without(extension: &str) -> Vec<u8> {
    let suffix = format!(".{}", extension);
    let entries: Vec<(String, Vec<u8>)> =
        shapefile_entries("counties", ShapeType::Polygon, &county_polygons())
            .into_iter()
            .filter(|(name, _)| !name.ends_with(&suffix))
            .collect();
    zip_entries(&entries)
}

/// A polygon shapefile whose `.shp` is cut short.
pub fn truncated_shapefile_zip() -> Vec<u8> {
    let mut entries = shapefile_entries("counties", ShapeType::Polygon, &county_polygons());
    let shp = &mut entries[0].1;
    shp.truncate(shp.len() - 40);
    zip_entries(&entries)
}

/// A valid zip with no shapefile in it.
pub fn zip_without_shapefile() -> Vec<u8> {
    zip_entries(&[
        ("README.txt", b"boundary data".to_vec()),
        ("counties.csv", b"id,name\n1,Salt Lake\n".to_vec()),
    ])
}

pub fn not_a_zip() -> Vec<u8> {
    b"this is not a zip archive".to_vec()
}
