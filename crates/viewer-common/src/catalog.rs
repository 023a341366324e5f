//! Product catalog: the static mapping from (platform, sensor, product) to
//! the hosted dataset that backs it.
//!
//! The catalog is loaded once at startup from YAML and never mutated
//! afterwards, so it can be shared across request handlers behind an `Arc`
//! without any locking.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("products.yaml");

/// Ordered collection of satellite platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub platforms: Vec<Platform>,
}

/// A satellite platform (e.g. "modis") and its sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: String,
    pub display: String,
    pub sensors: Vec<Sensor>,
}

/// A sensor aboard a platform (e.g. "terra").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: String,

    /// Label for option lists. Defaults to the upper-cased id.
    #[serde(default)]
    pub display: Option<String>,

    pub products: Vec<Product>,
}

impl Sensor {
    pub fn display_name(&self) -> String {
        self.display
            .clone()
            .unwrap_or_else(|| self.id.to_uppercase())
    }
}

/// A single imagery product backed by a hosted image collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,

    /// Human-readable name, also used as the plot title.
    pub display: String,

    /// Image collection identifier in the hosted catalog.
    pub collection: String,

    /// Band or index used for selection and time series. `None` means
    /// time series are not supported for this product.
    #[serde(default)]
    pub index: Option<String>,

    pub vis_params: VisParams,

    #[serde(default)]
    pub cloud_mask: Option<CloudMask>,

    /// First date with data.
    pub start_date: NaiveDate,

    /// Last date with data; `None` extends to the present.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Visualization parameters handed to the tile service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
}

/// Registered per-image cloud masking transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudMask {
    /// Landsat Collection 2 surface reflectance: drop pixels flagged as
    /// cloud or cloud shadow in `QA_PIXEL`.
    #[serde(rename = "mask_l8_sr")]
    LandsatSurfaceReflectance,
}

impl CloudMask {
    pub fn name(&self) -> &'static str {
        match self {
            CloudMask::LandsatSurfaceReflectance => "mask_l8_sr",
        }
    }
}

impl fmt::Display for CloudMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CloudMask {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mask_l8_sr" => Ok(CloudMask::LandsatSurfaceReflectance),
            other => Err(CatalogError::UnknownCloudMask(other.to_string())),
        }
    }
}

impl Catalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Parse and check a catalog document.
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_str(content)?;
        catalog.check()?;
        Ok(catalog)
    }

    /// Load a catalog from a YAML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let catalog = Self::from_yaml_str(&content)?;

        tracing::info!(
            path = %path.display(),
            products = catalog.product_count(),
            "Loaded product catalog"
        );

        Ok(catalog)
    }

    fn check(&self) -> Result<(), CatalogError> {
        if self.platforms.is_empty() {
            return Err(CatalogError::Empty);
        }

        for platform in &self.platforms {
            if platform.sensors.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "platform '{}' has no sensors",
                    platform.id
                )));
            }
            for sensor in &platform.sensors {
                if sensor.products.is_empty() {
                    return Err(CatalogError::Invalid(format!(
                        "sensor '{}/{}' has no products",
                        platform.id, sensor.id
                    )));
                }
                for product in &sensor.products {
                    if let Some(end) = product.end_date {
                        if end < product.start_date {
                            return Err(CatalogError::Invalid(format!(
                                "product '{}/{}/{}' ends before it starts",
                                platform.id, sensor.id, product.id
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    pub fn platform(&self, id: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn sensor(&self, platform: &str, sensor: &str) -> Option<&Sensor> {
        self.platform(platform)?
            .sensors
            .iter()
            .find(|s| s.id == sensor)
    }

    pub fn product(&self, platform: &str, sensor: &str, product: &str) -> Option<&Product> {
        self.sensor(platform, sensor)?
            .products
            .iter()
            .find(|p| p.id == product)
    }

    /// The platform whose first sensor and product seed the viewer controls.
    pub fn default_platform(&self) -> &Platform {
        self.platform("modis").unwrap_or(&self.platforms[0])
    }

    /// Every product with its platform and sensor ids, in catalog order.
    pub fn products(&self) -> impl Iterator<Item = (&str, &str, &Product)> {
        self.platforms.iter().flat_map(|platform| {
            platform.sensors.iter().flat_map(move |sensor| {
                sensor
                    .products
                    .iter()
                    .map(move |product| (platform.id.as_str(), sensor.id.as_str(), product))
            })
        })
    }

    pub fn product_count(&self) -> usize {
        self.products().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.platforms.len(), 3);
        assert_eq!(catalog.product_count(), 13);
    }

    #[test]
    fn test_lookup_snow() {
        let catalog = Catalog::builtin().unwrap();
        let snow = catalog.product("modis", "terra", "snow").unwrap();
        assert_eq!(snow.collection, "MODIS/061/MOD10A1");
        assert_eq!(snow.index.as_deref(), Some("NDSI_Snow_Cover"));
        assert_eq!(snow.start_date, NaiveDate::from_ymd_opt(2000, 2, 24).unwrap());
        assert!(snow.end_date.is_none());
        assert_eq!(snow.vis_params.palette.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_landsat_has_no_index_and_cloud_mask() {
        let catalog = Catalog::builtin().unwrap();
        let surface = catalog.product("landsat", "8", "surface").unwrap();
        assert!(surface.index.is_none());
        assert_eq!(surface.cloud_mask, Some(CloudMask::LandsatSurfaceReflectance));
        assert_eq!(surface.vis_params.gamma, Some(1.4));

        let toa = catalog.product("landsat", "9", "toa").unwrap();
        assert!(toa.cloud_mask.is_none());
    }

    #[test]
    fn test_default_platform_is_modis() {
        let catalog = Catalog::builtin().unwrap();
        let platform = catalog.default_platform();
        assert_eq!(platform.id, "modis");
        assert_eq!(platform.sensors[0].id, "terra");
        assert_eq!(platform.sensors[0].products[0].id, "snow");
        assert_eq!(platform.sensors[0].display_name(), "TERRA");
    }

    #[test]
    fn test_unknown_lookups() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.platform("goes").is_none());
        assert!(catalog.sensor("modis", "aqua").is_none());
        assert!(catalog.product("modis", "terra", "ndvi").is_none());
    }

    #[test]
    fn test_unknown_cloud_mask_rejected() {
        let yaml = r#"
platforms:
  - id: x
    display: X
    sensors:
      - id: y
        products:
          - id: z
            display: Z
            collection: C
            vis_params: { min: 0.0, max: 1.0 }
            cloud_mask: mask_unknown
            start_date: 2020-01-01
"#;
        assert!(matches!(
            Catalog::from_yaml_str(yaml),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let yaml = r#"
platforms:
  - id: x
    display: X
    sensors:
      - id: y
        products:
          - id: z
            display: Z
            collection: C
            vis_params: { min: 0.0, max: 1.0 }
            start_date: 2020-01-01
            end_date: 2019-01-01
"#;
        assert!(matches!(
            Catalog::from_yaml_str(yaml),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn test_cloud_mask_from_str() {
        assert_eq!(
            "mask_l8_sr".parse::<CloudMask>().unwrap(),
            CloudMask::LandsatSurfaceReflectance
        );
        assert!("nope".parse::<CloudMask>().is_err());
    }
}
