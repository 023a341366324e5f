//! Per-user boundary storage.
//!
//! An uploaded zip archive is unpacked into a temporary directory, the
//! first shapefile inside is validated, and the result is stored twice: as
//! `boundary.shp` in the user's workspace (used to frame the map) and as a
//! table asset in Earth Engine (used to clip composites).

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ee_client::gateway::escape_asset_name;
use ee_client::{GatewayError, ImageryGateway};
use metrics::counter;
use shapefile_parser::{ShapeType, Shapefile, ShapefileError};
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use viewer_common::{FramingProps, Ring};
use walkdir::WalkDir;
use zip::ZipArchive;

const BOUNDARY_DIR: &str = "boundary";
const BOUNDARY_STEM: &str = "boundary";
const UPLOAD_FILE_NAME: &str = "upload.zip";

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("You must provide a zip archive containing a shapefile.")]
    BadArchive(String),

    #[error("No Shapefile found in the archive provided.")]
    MissingShapefile,

    #[error("Only shapefiles containing Polygons are supported.")]
    NotPolygon(ShapeType),

    #[error("Incomplete or corrupted shapefile provided.")]
    Corrupted(#[source] ShapefileError),

    #[error("An unexpected error occurred while uploading the shapefile to Google Earth Engine.")]
    Remote(#[source] GatewayError),

    #[error("An unexpected error occurred while saving the boundary.")]
    Storage(String),
}

impl BoundaryError {
    /// Label used for the upload outcome metric.
    pub fn kind(&self) -> &'static str {
        match self {
            BoundaryError::BadArchive(_) => "bad_archive",
            BoundaryError::MissingShapefile => "missing_shapefile",
            BoundaryError::NotPolygon(_) => "not_polygon",
            BoundaryError::Corrupted(_) => "corrupted",
            BoundaryError::Remote(_) => "remote",
            BoundaryError::Storage(_) => "storage",
        }
    }
}

impl From<std::io::Error> for BoundaryError {
    fn from(e: std::io::Error) -> Self {
        BoundaryError::Storage(e.to_string())
    }
}

pub struct BoundaryStore {
    workspace_dir: PathBuf,
    gateway: Arc<ImageryGateway>,
}

impl BoundaryStore {
    pub fn new(workspace_dir: impl Into<PathBuf>, gateway: Arc<ImageryGateway>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            gateway,
        }
    }

    /// `<workspace>/<escaped user>/boundary`, named like the user's asset
    /// folder.
    pub fn boundary_dir(&self, user: &str) -> PathBuf {
        self.workspace_dir
            .join(escape_asset_name(user))
            .join(BOUNDARY_DIR)
    }

    /// Path of the user's stored boundary shapefile.
    pub fn boundary_path(&self, user: &str) -> PathBuf {
        self.boundary_dir(user)
            .join(format!("{}.shp", BOUNDARY_STEM))
    }

    /// Replace the user's boundary with the shapefile in `archive`.
    ///
    /// Nothing local or remote is touched until the archive has been
    /// unpacked and its shapefile read and found to hold polygons. Returns
    /// the id of the new asset.
    #[instrument(skip(self, archive), fields(bytes = archive.len()))]
    pub async fn upload(&self, user: &str, archive: Vec<u8>) -> Result<String, BoundaryError> {
        let result = self.upload_inner(user, archive).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        counter!("boundary_uploads_total", "outcome" => outcome).increment(1);
        result
    }

    async fn upload_inner(&self, user: &str, archive: Vec<u8>) -> Result<String, BoundaryError> {
        let target = self.boundary_dir(user);
        let polygons = tokio::task::spawn_blocking(move || store_local(&archive, &target))
            .await
            .map_err(|e| BoundaryError::Storage(e.to_string()))??;

        match self.gateway.replace_boundary(user, &polygons).await {
            Ok(asset_id) => {
                info!(%asset_id, polygons = polygons.len(), "Boundary uploaded");
                Ok(asset_id)
            }
            Err(e) => {
                error!(error = %e, "Failed to upload boundary to Earth Engine");
                Err(BoundaryError::Remote(e))
            }
        }
    }

    /// Map framing for the user's stored boundary, if there is one.
    pub async fn framing(&self, user: &str) -> Option<FramingProps> {
        let path = self.boundary_path(user);
        match tokio::task::spawn_blocking(move || read_framing(&path)).await {
            Ok(framing) => framing,
            Err(e) => {
                error!(error = %e, "Boundary framing task failed");
                None
            }
        }
    }
}

fn read_framing(path: &Path) -> Option<FramingProps> {
    if !path.is_file() {
        return None;
    }

    match Shapefile::read(path) {
        Ok(shapefile) => FramingProps::from_polygons(&polygon_rings(&shapefile)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Stored boundary is unreadable");
            None
        }
    }
}

/// Unpack, validate and write the archive's shapefile to `target`.
fn store_local(archive: &[u8], target: &Path) -> Result<Vec<Vec<Ring>>, BoundaryError> {
    let scratch = TempDir::new()?;
    extract_archive(archive, scratch.path())?;

    let shp_path = find_shapefile(scratch.path()).ok_or(BoundaryError::MissingShapefile)?;
    debug!(path = %shp_path.display(), "Found shapefile in archive");

    let shapefile = Shapefile::read(&shp_path).map_err(BoundaryError::Corrupted)?;
    if shapefile.shape_type() != ShapeType::Polygon {
        return Err(BoundaryError::NotPolygon(shapefile.shape_type()));
    }

    let polygons = polygon_rings(&shapefile);
    if polygons.is_empty() {
        return Err(BoundaryError::Corrupted(ShapefileError::InvalidFormat(
            "shapefile has no polygon records".to_string(),
        )));
    }

    if target.exists() {
        std::fs::remove_dir_all(target)?;
    }
    std::fs::create_dir_all(target)?;
    shapefile
        .write(target, BOUNDARY_STEM)
        .map_err(|e| BoundaryError::Storage(e.to_string()))?;

    Ok(polygons)
}

fn extract_archive(archive: &[u8], dir: &Path) -> Result<(), BoundaryError> {
    if archive.is_empty() {
        return Err(BoundaryError::BadArchive("empty upload".to_string()));
    }

    let zip_path = dir.join(UPLOAD_FILE_NAME);
    std::fs::write(&zip_path, archive)?;

    let file = File::open(&zip_path)?;
    let mut zip = ZipArchive::new(file).map_err(|e| BoundaryError::BadArchive(e.to_string()))?;
    zip.extract(dir)
        .map_err(|e| BoundaryError::BadArchive(e.to_string()))?;

    Ok(())
}

/// First `.shp` under `dir` in file-name order, ignoring macOS metadata.
fn find_shapefile(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "__MACOSX")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with("._"))
        .map(|entry| entry.into_path())
        .find(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("shp"))
                .unwrap_or(false)
        })
}

fn polygon_rings(shapefile: &Shapefile) -> Vec<Vec<Ring>> {
    shapefile
        .polygons()
        .flat_map(|polygon| polygon.grouped())
        .collect()
}
