//! Imagery operations built on [`EarthEngineApi`].
//!
//! The gateway turns validated queries into expression graphs, runs them
//! and reshapes the results. It holds no state beyond the API handle and
//! the asset root, so one instance serves all requests.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use viewer_common::dates::format_date;
use viewer_common::{
    CloudMask, CompositeQuery, DateRange, Product, QueryGeometry, Reducer, Ring, TimeSeriesQuery,
    VisParams,
};

use crate::client::{EarthEngineApi, MapRequest};
use crate::error::GatewayResult;
use crate::expression::{Expression, Value};
use crate::series::TimeSeries;

pub const TILE_URL_BASE: &str = "https://earthengine.googleapis.com/v1";
pub const TIME_START_PROPERTY: &str = "system:time_start";
pub const BOUNDARY_ASSET_NAME: &str = "boundary";

const IMAGE_ARG: &str = "image";
const INDEX_VALUE_PROPERTY: &str = "indexValue";
const EXPORT_DESCRIPTION: &str = "uploadToTableAsset";

/// QA_PIXEL bits flagging cloud (3) and cloud shadow (4) in Landsat
/// Collection 2 surface reflectance.
const LANDSAT_CLOUD_BIT: i64 = 1 << 3;
const LANDSAT_SHADOW_BIT: i64 = 1 << 4;
const LANDSAT_QA_BAND: &str = "QA_PIXEL";

pub struct ImageryGateway {
    api: Arc<dyn EarthEngineApi>,
    asset_root: String,
}

impl ImageryGateway {
    /// `asset_root` is the folder holding per-user folders, for example
    /// `projects/my-project/assets/earth_engine_app`.
    pub fn new(api: Arc<dyn EarthEngineApi>, asset_root: impl Into<String>) -> Self {
        Self {
            api,
            asset_root: asset_root.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn asset_root(&self) -> &str {
        &self.asset_root
    }

    pub fn user_folder(&self, user: &str) -> String {
        format!("{}/{}", self.asset_root, escape_asset_name(user))
    }

    pub fn boundary_asset_id(&self, user: &str) -> String {
        format!("{}/{}", self.user_folder(user), BOUNDARY_ASSET_NAME)
    }

    /// Build a composite for the query and return an XYZ tile URL template.
    ///
    /// With `clip_user`, the composite is clipped to that user's boundary
    /// asset when one exists.
    #[instrument(skip(self, query), fields(
        platform = %query.platform,
        sensor = %query.sensor,
        product = %query.product.id,
        reducer = %query.reducer
    ))]
    pub async fn tile_url(
        &self,
        query: &CompositeQuery,
        clip_user: Option<&str>,
    ) -> GatewayResult<String> {
        let mut image = composite(&query.product, &query.date_range, query.reducer);

        if let Some(user) = clip_user {
            let asset_id = self.boundary_asset_id(user);
            match self.api.asset_exists(&asset_id).await {
                Ok(true) => {
                    debug!(%asset_id, "Clipping composite to boundary");
                    image = clip_to_table(image, &asset_id);
                }
                Ok(false) => {}
                Err(e) => warn!(%asset_id, error = %e, "Boundary lookup failed, not clipping"),
            }
        }

        let request = MapRequest::new(Expression::new(visualize(image, &query.product.vis_params)));
        match self.api.create_map(&request).await {
            Ok(name) => {
                let url = tile_url_for(&name);
                info!(%url, "Created tile layer");
                Ok(url)
            }
            Err(e) => {
                error!(
                    collection = %query.product.collection,
                    error = %e,
                    "Failed to create map for image collection"
                );
                Err(e)
            }
        }
    }

    /// Compute one time series per geometry member.
    ///
    /// Members that fail are logged and left out. An error is returned only
    /// when every member fails, and it is the first member's error.
    #[instrument(skip(self, query), fields(
        product = %query.product.id,
        index = %query.index_name,
        members = query.geometry.len()
    ))]
    pub async fn time_series(&self, query: &TimeSeriesQuery) -> GatewayResult<Vec<TimeSeries>> {
        let results = join_all(
            query
                .geometry
                .iter()
                .map(|member| self.member_series(query, member)),
        )
        .await;

        let mut series = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(ts) => series.push(ts),
                Err(e) => {
                    error!(member = i, error = %e, "Failed to compute time series");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if series.is_empty() => Err(e),
            _ => Ok(series),
        }
    }

    async fn member_series(
        &self,
        query: &TimeSeriesQuery,
        member: &QueryGeometry,
    ) -> GatewayResult<TimeSeries> {
        debug!(kind = member.kind(), "Computing time series for geometry");
        let expression = Expression::new(region_series(query, member));
        let result = self.api.compute_value(&expression).await?;
        TimeSeries::from_computed(&query.index_name, &result)
    }

    /// Replace the user's boundary asset with the given polygons.
    ///
    /// The old asset is deleted before the export starts, so a failed
    /// export leaves the user with no remote boundary.
    #[instrument(skip(self, polygons), fields(polygons = polygons.len()))]
    pub async fn replace_boundary(&self, user: &str, polygons: &[Vec<Ring>]) -> GatewayResult<String> {
        let asset_id = self.boundary_asset_id(user);

        self.ensure_folder(&self.asset_root).await?;
        self.ensure_folder(&self.user_folder(user)).await?;

        if self.api.asset_exists(&asset_id).await? {
            debug!(%asset_id, "Deleting previous boundary");
            self.api.delete_asset(&asset_id).await?;
        }

        let expression = Expression::new(feature_collection(polygons));
        self.api
            .export_table(&expression, &asset_id, EXPORT_DESCRIPTION)
            .await?;

        info!(%asset_id, "Exported boundary");
        Ok(asset_id)
    }

    async fn ensure_folder(&self, folder: &str) -> GatewayResult<()> {
        if !self.api.asset_exists(folder).await? {
            debug!(folder, "Creating asset folder");
            self.api.create_folder(folder).await?;
        }
        Ok(())
    }
}

/// `{base}/{map name}/tiles/{z}/{x}/{y}`
pub fn tile_url_for(map_name: &str) -> String {
    format!("{}/{}/tiles/{{z}}/{{x}}/{{y}}", TILE_URL_BASE, map_name)
}

/// Escape a user id into an asset name, which allows only letters, digits,
/// `_` and `-`.
///
/// `_` becomes `__` and any other disallowed byte becomes `_` plus two hex
/// digits, so distinct ids always map to distinct names.
pub fn escape_asset_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' => escaped.push(byte as char),
            b'_' => escaped.push_str("__"),
            _ => escaped.push_str(&format!("_{:02X}", byte)),
        }
    }
    escaped
}

fn image() -> Value {
    Value::argument(IMAGE_ARG)
}

fn load_collection(product: &Product, range: &DateRange) -> Value {
    let collection = Value::call(
        "ImageCollection.load",
        [("id", Value::constant(product.collection.as_str()))],
    );
    Value::call(
        "Collection.filter",
        [("collection", collection), ("filter", date_filter(range))],
    )
}

/// Images acquired in `[start, end)`.
fn date_filter(range: &DateRange) -> Value {
    let dates = Value::call(
        "DateRange",
        [
            ("start", Value::constant(format_date(range.start))),
            ("end", Value::constant(format_date(range.end))),
        ],
    );
    Value::call(
        "Filter.dateRangeContains",
        [
            ("leftValue", dates),
            ("rightField", Value::constant(TIME_START_PROPERTY)),
        ],
    )
}

fn map_images(collection: Value, body: Value) -> Value {
    Value::call(
        "Collection.map",
        [
            ("collection", collection),
            ("baseAlgorithm", Value::function(IMAGE_ARG, body)),
        ],
    )
}

fn select_bands<S: AsRef<str>>(input: Value, bands: &[S]) -> Value {
    Value::call(
        "Image.select",
        [("input", input), ("bandSelectors", Value::strings(bands))],
    )
}

fn composite(product: &Product, range: &DateRange, reducer: Reducer) -> Value {
    let mut collection = load_collection(product, range);

    if let Some(index) = &product.index {
        collection = map_images(collection, select_bands(image(), &[index]));
    }
    if let Some(mask) = product.cloud_mask {
        collection = map_images(collection, cloud_mask(mask));
    }

    match reducer {
        Reducer::Mosaic => Value::call("ImageCollection.mosaic", [("collection", collection)]),
        other => Value::call(
            &format!("reduce.{}", other.as_str()),
            [("collection", collection)],
        ),
    }
}

fn cloud_mask(mask: CloudMask) -> Value {
    match mask {
        CloudMask::LandsatSurfaceReflectance => {
            let qa = || select_bands(image(), &[LANDSAT_QA_BAND]);
            let bit_clear = |bit: i64| {
                let flagged = Value::call(
                    "Image.bitwiseAnd",
                    [("image1", qa()), ("image2", constant_image(bit))],
                );
                Value::call("Image.eq", [("image1", flagged), ("image2", constant_image(0))])
            };
            let clear = Value::call(
                "Image.and",
                [
                    ("image1", bit_clear(LANDSAT_CLOUD_BIT)),
                    ("image2", bit_clear(LANDSAT_SHADOW_BIT)),
                ],
            );
            Value::call("Image.updateMask", [("image", image()), ("mask", clear)])
        }
    }
}

fn constant_image(value: i64) -> Value {
    Value::call("Image.constant", [("value", Value::constant(value))])
}

fn clip_to_table(image: Value, table_id: &str) -> Value {
    let table = Value::call("Collection.loadTable", [("tableId", Value::constant(table_id))]);
    Value::call("Image.clipToCollection", [("input", image), ("collection", table)])
}

fn visualize(image: Value, vis: &VisParams) -> Value {
    let mut args = vec![
        ("image", image),
        ("min", Value::constant(vis.min)),
        ("max", Value::constant(vis.max)),
    ];
    if let Some(palette) = &vis.palette {
        args.push(("palette", Value::strings(palette)));
    }
    if let Some(bands) = &vis.bands {
        args.push(("bands", Value::strings(bands)));
    }
    if let Some(gamma) = vis.gamma {
        args.push(("gamma", Value::constant(gamma)));
    }
    Value::call("Image.visualize", args)
}

/// Reducer applied over pixels in a region. There is no pixel-wise mosaic,
/// so mosaic takes the first value.
fn region_reducer(reducer: Reducer) -> Value {
    let name = match reducer {
        Reducer::Mosaic => "first",
        other => other.as_str(),
    };
    Value::invoke(&format!("Reducer.{}", name))
}

fn geometry_value(geometry: &QueryGeometry) -> Value {
    match geometry {
        QueryGeometry::Point(position) => Value::call(
            "GeometryConstructors.Point",
            [("coordinates", Value::constant(position.to_vec()))],
        ),
        QueryGeometry::Polygon(rings) => polygon_value(rings),
    }
}

fn polygon_value(rings: &[Ring]) -> Value {
    let coordinates: Vec<Vec<Vec<f64>>> = rings
        .iter()
        .map(|ring| ring.iter().map(|p| p.to_vec()).collect())
        .collect();
    Value::call(
        "GeometryConstructors.Polygon",
        [("coordinates", Value::constant(coordinates))],
    )
}

/// `[[time_start, value], ...]` for every image in range, reduced over the
/// region.
fn region_series(query: &TimeSeriesQuery, member: &QueryGeometry) -> Value {
    let collection = map_images(
        load_collection(&query.product, &query.date_range),
        select_bands(image(), &[&query.index_name]),
    );

    let stats = Value::call(
        "Image.reduceRegion",
        [
            ("image", image()),
            ("reducer", region_reducer(query.reducer)),
            ("geometry", geometry_value(member)),
            ("scale", Value::constant(query.scale)),
        ],
    );
    let value = Value::call(
        "Dictionary.get",
        [
            ("dictionary", stats),
            ("key", Value::constant(query.index_name.as_str())),
        ],
    );
    let time = Value::call(
        "Element.get",
        [
            ("object", image()),
            ("property", Value::constant(TIME_START_PROPERTY)),
        ],
    );
    let tagged = Value::call(
        "Element.set",
        [
            ("object", image()),
            ("key", Value::constant(INDEX_VALUE_PROPERTY)),
            ("value", Value::array([time, value])),
        ],
    );

    Value::call(
        "AggregateFeatureCollection.array",
        [
            ("collection", map_images(collection, tagged)),
            ("property", Value::constant(INDEX_VALUE_PROPERTY)),
        ],
    )
}

fn feature_collection(polygons: &[Vec<Ring>]) -> Value {
    let features = polygons
        .iter()
        .map(|rings| Value::call("Feature", [("geometry", polygon_value(rings))]));
    Value::call("Collection", [("features", Value::array(features))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use viewer_common::{Catalog, Orientation};

    fn product(platform: &str, sensor: &str, id: &str) -> Product {
        Catalog::builtin()
            .unwrap()
            .product(platform, sensor, id)
            .unwrap()
            .clone()
    }

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_tile_url_template() {
        assert_eq!(
            tile_url_for("projects/p/maps/abc-123"),
            "https://earthengine.googleapis.com/v1/projects/p/maps/abc-123/tiles/{z}/{x}/{y}"
        );
    }

    #[test]
    fn test_escape_asset_name() {
        assert_eq!(escape_asset_name("alice"), "alice");
        assert_eq!(escape_asset_name("bob@example.com"), "bob_40example_2Ecom");
        assert_eq!(escape_asset_name("a-b_c"), "a-b__c");
        assert_eq!(escape_asset_name("é"), "_C3_A9");
    }

    #[test]
    fn test_escaped_names_do_not_collide() {
        let ids = ["alice.smith", "alice_smith", "alice@smith", "alice_2Esmith", "alice__smith"];
        let names: std::collections::HashSet<String> =
            ids.iter().map(|id| escape_asset_name(id)).collect();
        assert_eq!(names.len(), ids.len());
    }

    #[test]
    fn test_composite_median_selects_index() {
        let expr = Expression::new(composite(
            &product("modis", "terra", "snow"),
            &january(),
            Reducer::Median,
        ));
        assert!(expr.invokes("ImageCollection.load"));
        assert!(expr.invokes("Filter.dateRangeContains"));
        assert!(expr.invokes("Image.select"));
        assert!(expr.invokes("reduce.median"));
        assert!(!expr.invokes("Image.updateMask"));
        assert!(expr.constants().contains(&&serde_json::json!("2020-01-31")));
    }

    #[test]
    fn test_composite_mosaic_with_cloud_mask() {
        let expr = Expression::new(composite(
            &product("landsat", "8", "surface"),
            &january(),
            Reducer::Mosaic,
        ));
        assert!(expr.invokes("ImageCollection.mosaic"));
        assert!(expr.invokes("Image.updateMask"));
        assert!(expr.invokes("Image.bitwiseAnd"));
        // no index band for surface reflectance, only the QA select
        assert!(expr.constants().contains(&&serde_json::json!("QA_PIXEL")));
    }

    #[test]
    fn test_visualize_carries_palette() {
        let p = product("modis", "terra", "snow");
        let expr = Expression::new(visualize(Value::null(), &p.vis_params));
        assert!(expr.invokes("Image.visualize"));
        let wire = serde_json::to_value(&expr).unwrap();
        let args = &wire["values"][&expr.result]["functionInvocationValue"]["arguments"];
        assert!(args["palette"]["arrayValue"]["values"].is_array());
        assert!(args.get("gamma").is_none());
    }

    #[test]
    fn test_region_series_expression() {
        let query = TimeSeriesQuery {
            platform: "modis".to_string(),
            sensor: "terra".to_string(),
            product: product("modis", "terra", "snow"),
            index_name: "NDSI_Snow_Cover".to_string(),
            date_range: january(),
            reducer: Reducer::Mosaic,
            geometry: vec![QueryGeometry::Point([-111.9, 40.7])],
            scale: 250.0,
            orient: Orientation::Dict,
        };
        let expr = Expression::new(region_series(&query, &query.geometry[0]));
        assert!(expr.invokes("Image.reduceRegion"));
        assert!(expr.invokes("Reducer.first"));
        assert!(expr.invokes("GeometryConstructors.Point"));
        assert!(expr.invokes("AggregateFeatureCollection.array"));
    }
}
