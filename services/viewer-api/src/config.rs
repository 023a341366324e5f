//! Service configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use viewer_common::Catalog;

pub const DEFAULT_USER_HEADER: &str = "x-forwarded-user";
pub const DEFAULT_USER: &str = "anonymous";
pub const DEFAULT_ASSET_FOLDER: &str = "earth_engine_app";

/// Settings shared by the handlers.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Root of the per-user workspaces holding uploaded boundaries.
    pub workspace_dir: PathBuf,

    /// Header carrying the caller's user id, set by the fronting proxy.
    pub user_header: String,

    /// User id when the header is absent.
    pub default_user: String,

    /// Earth Engine folder holding per-user boundary assets.
    pub asset_root: String,

    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("workspaces"),
            user_header: DEFAULT_USER_HEADER.to_string(),
            default_user: DEFAULT_USER.to_string(),
            asset_root: default_asset_root("earthengine-legacy"),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// `projects/<project>/assets/earth_engine_app`
pub fn default_asset_root(project: &str) -> String {
    format!("projects/{}/assets/{}", project, DEFAULT_ASSET_FOLDER)
}

/// Load the catalog from `path`, or the built-in one.
pub fn load_catalog(path: Option<&PathBuf>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load product catalog from {}", path.display())),
        None => Catalog::builtin().context("Failed to load built-in product catalog"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_asset_root() {
        assert_eq!(
            default_asset_root("my-project"),
            "projects/my-project/assets/earth_engine_app"
        );
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = load_catalog(None).unwrap();
        assert_eq!(catalog.product_count(), 13);
    }

    #[test]
    fn test_missing_catalog_file() {
        let err = load_catalog(Some(&PathBuf::from("/nonexistent/products.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load product catalog"));
    }
}
