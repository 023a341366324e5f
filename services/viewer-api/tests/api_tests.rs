//! Router tests against the recording fake Earth Engine API.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ee_client::gateway::escape_asset_name;
use ee_client::GatewayError;
use serde_json::Value;
use tempfile::TempDir;
use test_utils::fixtures::{dates, geometry, results};
use test_utils::{archives, assert_approx_eq, ApiCall, RecordingEarthEngineApi, TEST_USER};
use tower::ServiceExt;
use viewer_api::config::ViewerConfig;
use viewer_api::state::AppState;
use viewer_common::Catalog;

const ASSET_ROOT: &str = "projects/test-project/assets/earth_engine_app";
const MULTIPART_BOUNDARY: &str = "viewer-test-boundary";

struct TestApp {
    api: Arc<RecordingEarthEngineApi>,
    router: Router,
    workspace: TempDir,
}

impl TestApp {
    fn new(api: RecordingEarthEngineApi) -> Self {
        let workspace = TempDir::new().unwrap();
        let api = Arc::new(api);
        let config = ViewerConfig {
            workspace_dir: workspace.path().to_path_buf(),
            asset_root: ASSET_ROOT.to_string(),
            ..Default::default()
        };
        let state = AppState::new(config, Catalog::builtin().unwrap(), api.clone());

        Self {
            api,
            router: viewer_api::app(Arc::new(state)),
            workspace,
        }
    }

    fn boundary_dir(&self, user: &str) -> PathBuf {
        self.workspace
            .path()
            .join(escape_asset_name(user))
            .join("boundary")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, location, json)
    }

    async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-user", TEST_USER)
            .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
            .unwrap();
        let (status, _, json) = self.send(request).await;
        (status, json)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.get_as(TEST_USER, uri).await
    }

    async fn get_as(&self, user: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .header("x-forwarded-user", user)
            .body(Body::empty())
            .unwrap();
        let (status, _, json) = self.send(request).await;
        (status, json)
    }

    async fn upload(&self, archive: Vec<u8>) -> (StatusCode, Option<String>, Value) {
        self.upload_as(TEST_USER, archive).await
    }

    async fn upload_as(&self, user: &str, archive: Vec<u8>) -> (StatusCode, Option<String>, Value) {
        self.send(upload_request(user, "boundary-file", archive)).await
    }

    /// POST a JSON body where a form is expected.
    async fn post_json(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-user", TEST_USER)
            .body(Body::from(r#"{"platform":"modis"}"#))
            .unwrap();
        let (status, _, json) = self.send(request).await;
        (status, json)
    }
}

fn upload_request(user: &str, field: &str, archive: Vec<u8>) -> Request<Body> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"boundary.zip\"\r\n\
         Content-Type: application/zip\r\n\r\n",
        b = MULTIPART_BOUNDARY,
        field = field
    )
    .into_bytes();
    body.extend_from_slice(&archive);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/viewer")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .header("x-forwarded-user", user)
        .body(Body::from(body))
        .unwrap()
}

fn snow_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("platform", "modis"),
        ("sensor", "terra"),
        ("product", "snow"),
        ("start_date", dates::JANUARY_2020_START),
        ("end_date", dates::JANUARY_2020_END),
        ("reducer", "median"),
    ]
}

fn with<'a>(
    mut fields: Vec<(&'a str, &'a str)>,
    extra: &[(&'a str, &'a str)],
) -> Vec<(&'a str, &'a str)> {
    for &(key, value) in extra {
        fields.retain(|(k, _)| *k != key);
        fields.push((key, value));
    }
    fields
}

fn boundary_asset() -> String {
    format!("{}/{}/boundary", ASSET_ROOT, TEST_USER)
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, json) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, _) = app.get("/metrics").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_home_and_about() {
    let app = TestApp::new(RecordingEarthEngineApi::new());

    let (status, home) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(home["name"], "Earth Engine");
    assert_eq!(home["links"][0]["href"], "/viewer");

    let (status, about) = app.get("/about").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(about["platforms"].as_array().unwrap().len(), 3);
    assert_eq!(about["platforms"][0]["id"], "modis");
}

#[tokio::test]
async fn test_viewer_context_defaults() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, context) = app.get("/viewer").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(context["platform_options"][0]["value"], "modis");
    assert_eq!(context["product_options"][0]["value"], "snow");
    assert_eq!(context["start_date"]["start_date"], "2000-02-24");
    assert_eq!(context["map_view"]["extent"], serde_json::json!([-180.0, -90.0, 180.0, 90.0]));
    assert_eq!(context["map_view"]["zoom"], 3);
    assert_eq!(context["set_boundary_error"], "");
    assert!(context["ee_products"]["platforms"].is_array());
    assert_eq!(app.api.call_count(), 0);
}

// ============================================================================
// Image collections
// ============================================================================

#[tokio::test]
async fn test_image_collection_returns_tile_url() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, json) = app
        .post_form("/viewer/get-image-collection", &snow_fields())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let url = json["url"].as_str().unwrap();
    assert!(url.contains(results::MAP_NAME));
    assert!(url.ends_with("/tiles/{z}/{x}/{y}"));
}

#[tokio::test]
async fn test_image_collection_rejects_unknown_platform() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let fields = with(snow_fields(), &[("platform", "goes")]);
    let (status, json) = app
        .post_form("/viewer/get-image-collection", &fields)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Error Processing Request: Unknown platform: goes");
    assert_eq!(app.api.call_count(), 0);
}

#[tokio::test]
async fn test_image_collection_remote_failure_is_generic() {
    let app = TestApp::new(RecordingEarthEngineApi::new().failing_maps(GatewayError::Api {
        status: 400,
        message: "Collection.load: asset not found".to_string(),
    }));
    let (_, json) = app
        .post_form("/viewer/get-image-collection", &snow_fields())
        .await;

    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "Error Processing Request: An unexpected error has occurred. Please try again."
    );
    assert!(json.get("url").is_none());
}

#[tokio::test]
async fn test_image_collection_requires_post() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, _) = app.get("/viewer/get-image-collection").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Time series plots
// ============================================================================

#[tokio::test]
async fn test_plot_single_point() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let fields = with(snow_fields(), &[("geometry", geometry::POINT_GEOJSON)]);
    let (status, json) = app
        .post_form("/viewer/get-time-series-plot", &fields)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let traces = json["plot"]["data"].as_array().unwrap();
    assert_eq!(traces.len(), 1);

    let x: Vec<&str> = traces[0]["x"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let mut sorted = x.clone();
    sorted.sort();
    assert_eq!(x, sorted);
    assert_eq!(x[0], "2020-01-01T00:00:00.000Z");
    assert!(traces[0]["y"][1].is_null());

    assert_eq!(json["plot"]["layout"]["title"]["text"], "Snow Cover Daily Global 500m");
    assert_eq!(json["plot"]["layout"]["yaxis"]["title"], "NDSI Snow Cover");
    assert_eq!(app.api.compute_expressions().len(), 1);
}

#[tokio::test]
async fn test_plot_unsupported_index_makes_no_remote_call() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let fields = with(
        snow_fields(),
        &[
            ("platform", "landsat"),
            ("sensor", "8"),
            ("product", "surface"),
            ("geometry", geometry::POINT_GEOJSON),
        ],
    );
    let (_, json) = app
        .post_form("/viewer/get-time-series-plot", &fields)
        .await;

    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "We're sorry, but plotting Surface Reflectance is not supported at this time. \
         Please select a different product."
    );
    assert_eq!(app.api.call_count(), 0);
}

#[tokio::test]
async fn test_plot_without_geometry() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (_, json) = app
        .post_form("/viewer/get-time-series-plot", &snow_fields())
        .await;

    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Please draw an area of interest."));
}

#[tokio::test]
async fn test_plot_timeout_message() {
    let app = TestApp::new(
        RecordingEarthEngineApi::new().with_compute_result(Err(GatewayError::Timeout)),
    );
    let fields = with(snow_fields(), &[("geometry", geometry::POINT_GEOJSON)]);
    let (_, json) = app
        .post_form("/viewer/get-time-series-plot", &fields)
        .await;

    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "The request to Google Earth Engine timed out. Please try again."
    );
}

// ============================================================================
// REST API
// ============================================================================

#[tokio::test]
async fn test_api_get_records() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let fields = with(
        snow_fields(),
        &[("geometry", geometry::POINT_GEOJSON), ("orient", "records")],
    );
    let (status, json) = app
        .get(&format!(
            "/api/get-time-series?{}",
            serde_urlencoded::to_string(&fields).unwrap()
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    let records = json["time_series"][0].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["Time"], 1577836800000i64);
    assert_eq!(records[0]["NDSI Snow Cover"], 41.5);

    let params = &json["parameters"];
    assert_eq!(params["product"], "snow");
    assert_eq!(params["index_name"], "NDSI_Snow_Cover");
    assert_eq!(params["start"], "2020-01-01");
    assert_eq!(params["orient"], "records");
    assert_eq!(params["scale"], 250.0);
    assert_eq!(params["geometry"][0]["type"], "Point");
}

#[tokio::test]
async fn test_api_post_defaults_to_dict() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let fields = with(snow_fields(), &[("geometry", geometry::DRAWN_COLLECTION_GEOJSON)]);
    let (status, json) = app.post_form("/api/get-time-series", &fields).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["time_series"].as_array().unwrap().len(), 2);
    assert_eq!(json["time_series"][0]["Time"]["0"], 1577836800000i64);
    assert_eq!(json["parameters"]["orient"], "dict");
}

#[tokio::test]
async fn test_api_validation_error_is_bad_request() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let fields = with(
        snow_fields(),
        &[("geometry", geometry::POINT_GEOJSON), ("start_date", "2020-13-01")],
    );
    let (status, json) = app.post_form("/api/get-time-series", &fields).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["rule"], "invalid_date");
    assert_eq!(json["field"], "start_date");
    assert!(json["error"].as_str().unwrap().contains("2020-13-01"));
    assert_eq!(app.api.call_count(), 0);
}

#[tokio::test]
async fn test_api_start_after_end() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let fields = with(
        snow_fields(),
        &[
            ("geometry", geometry::POINT_GEOJSON),
            ("start_date", "2020-02-01"),
            ("end_date", "2020-01-01"),
        ],
    );
    let (status, json) = app.post_form("/api/get-time-series", &fields).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["rule"], "start_after_end");
}

#[tokio::test]
async fn test_api_timeout_is_gateway_timeout() {
    let app = TestApp::new(
        RecordingEarthEngineApi::new().with_compute_result(Err(GatewayError::Timeout)),
    );
    let fields = with(snow_fields(), &[("geometry", geometry::POINT_GEOJSON)]);
    let (status, json) = app.post_form("/api/get-time-series", &fields).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(json["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_api_remote_failure_is_internal_error() {
    let app = TestApp::new(RecordingEarthEngineApi::new().with_compute_result(Err(
        GatewayError::Api {
            status: 400,
            message: "Image.reduceRegion: too many pixels".to_string(),
        },
    )));
    let fields = with(snow_fields(), &[("geometry", geometry::POINT_GEOJSON)]);
    let (status, json) = app.post_form("/api/get-time-series", &fields).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An unexpected error has occurred. Please try again.");
}

// ============================================================================
// Boundary upload
// ============================================================================

#[tokio::test]
async fn test_upload_polygon_boundary() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, location, _) = app.upload(archives::polygon_shapefile_zip()).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/viewer"));
    assert!(app.api.has_asset(&boundary_asset()));
    assert!(app.boundary_dir(TEST_USER).join("boundary.shp").is_file());

    // The stored boundary frames the map and contains every vertex.
    let (_, context) = app.get("/viewer").await;
    let extent: Vec<f64> = context["map_view"]["extent"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_approx_eq!(extent[0], -112.26, 1e-9);
    assert_approx_eq!(extent[1], 39.81, 1e-9);
    assert_approx_eq!(extent[2], -111.25, 1e-9);
    assert_approx_eq!(extent[3], 40.85, 1e-9);
    for polygon in archives::county_polygons() {
        if let shapefile_parser::Shape::Polygon(polygon) = polygon {
            for [x, y] in polygon.rings.iter().flatten() {
                assert!(*x >= extent[0] && *x <= extent[2]);
                assert!(*y >= extent[1] && *y <= extent[3]);
            }
        }
    }
    let zoom = context["map_view"]["zoom"].as_i64().unwrap();
    assert!((2..=18).contains(&zoom));
}

#[tokio::test]
async fn test_upload_twice_keeps_one_boundary() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    app.upload(archives::polygon_shapefile_zip()).await;
    let (status, _, _) = app.upload(archives::nested_polygon_shapefile_zip()).await;

    assert_eq!(status, StatusCode::SEE_OTHER);

    let remote: Vec<String> = app
        .api
        .assets()
        .into_iter()
        .filter(|a| a.ends_with("/boundary"))
        .collect();
    assert_eq!(remote, vec![boundary_asset()]);

    let mut local: Vec<String> = std::fs::read_dir(app.boundary_dir(TEST_USER))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    local.sort();
    assert_eq!(
        local,
        ["boundary.dbf", "boundary.prj", "boundary.shp", "boundary.shx"]
    );
}

#[tokio::test]
async fn test_upload_point_shapefile_is_rejected() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, _, context) = app.upload(archives::point_shapefile_zip()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        context["set_boundary_error"],
        "Only shapefiles containing Polygons are supported."
    );
    assert!(!app.api.has_asset(&boundary_asset()));
    assert!(!app
        .api
        .calls()
        .iter()
        .any(|c| matches!(c, ApiCall::ExportTable { .. } | ApiCall::DeleteAsset(_))));
    assert!(!app.boundary_dir(TEST_USER).exists());
}

#[tokio::test]
async fn test_point_upload_keeps_previous_boundary() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    app.upload(archives::polygon_shapefile_zip()).await;
    let exports_before = app.api.exports().len();

    app.upload(archives::point_shapefile_zip()).await;

    assert!(app.api.has_asset(&boundary_asset()));
    assert_eq!(app.api.exports().len(), exports_before);
    assert!(app.boundary_dir(TEST_USER).join("boundary.shp").is_file());
}

#[tokio::test]
async fn test_upload_error_messages() {
    let cases = [
        (
            archives::not_a_zip(),
            "You must provide a zip archive containing a shapefile.",
        ),
        (
            archives::zip_without_shapefile(),
            "No Shapefile found in the archive provided.",
        ),
        (
            archives::shapefile_zip_without("shx"),
            "Incomplete or corrupted shapefile provided.",
        ),
        (
            archives::truncated_shapefile_zip(),
            "Incomplete or corrupted shapefile provided.",
        ),
    ];

    for (archive, message) in cases {
        let app = TestApp::new(RecordingEarthEngineApi::new());
        let (status, _, context) = app.upload(archive).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(context["set_boundary_error"], message);
        assert_eq!(app.api.call_count(), 0);
    }
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (_, _, context) = app
        .send(upload_request(TEST_USER, "other-file", archives::polygon_shapefile_zip()))
        .await;

    assert_eq!(
        context["set_boundary_error"],
        "You must provide a zip archive containing a shapefile."
    );
}

#[tokio::test]
async fn test_upload_remote_failure_message() {
    let app = TestApp::new(
        RecordingEarthEngineApi::new().failing_exports(GatewayError::Transport(
            "connection reset".to_string(),
        )),
    );
    let (_, _, context) = app.upload(archives::polygon_shapefile_zip()).await;

    assert_eq!(
        context["set_boundary_error"],
        "An unexpected error occurred while uploading the shapefile to Google Earth Engine."
    );
    assert!(!app.api.has_asset(&boundary_asset()));
}

#[tokio::test]
async fn test_composite_clipped_after_upload() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    app.upload(archives::polygon_shapefile_zip()).await;

    let (_, json) = app
        .post_form("/viewer/get-image-collection", &snow_fields())
        .await;

    assert_eq!(json["success"], true);
    let maps = app.api.map_expressions();
    assert!(maps[0].invokes("Image.clipToCollection"));
}

#[tokio::test]
async fn test_boundaries_isolated_between_similar_user_ids() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, _, _) = app
        .upload_as("alice.smith", archives::polygon_shapefile_zip())
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    for other in ["alice_smith", "alice@smith", "alice smith"] {
        let (_, context) = app.get_as(other, "/viewer").await;
        assert_eq!(
            context["map_view"]["extent"],
            serde_json::json!([-180.0, -90.0, 180.0, 90.0]),
            "{} sees another user's boundary",
            other
        );
        assert!(!app.boundary_dir(other).exists());
    }

    let (_, context) = app.get_as("alice.smith", "/viewer").await;
    assert_eq!(context["map_view"]["zoom"], 8);
    assert_eq!(app.api.assets().iter().filter(|a| a.ends_with("/boundary")).count(), 1);
}

// ============================================================================
// Unreadable request bodies
// ============================================================================

#[tokio::test]
async fn test_image_collection_non_form_body_answers_json() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, json) = app.post_json("/viewer/get-image-collection").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Error Processing Request: Unknown platform"));
    assert_eq!(app.api.call_count(), 0);
}

#[tokio::test]
async fn test_plot_non_form_body_answers_json() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, json) = app.post_json("/viewer/get-time-series-plot").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().starts_with("Unknown platform"));
    assert_eq!(app.api.call_count(), 0);
}

#[tokio::test]
async fn test_api_non_form_body_is_validation_error() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, json) = app.post_json("/api/get-time-series").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["rule"], "unknown_platform");
    assert_eq!(json["field"], "platform");
}

#[tokio::test]
async fn test_api_unreadable_query_is_validation_error() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, json) = app
        .get("/api/get-time-series?platform=modis&platform=landsat")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["rule"], "unknown_platform");
}

#[tokio::test]
async fn test_upload_non_multipart_body_sets_error() {
    let app = TestApp::new(RecordingEarthEngineApi::new());
    let (status, json) = app.post_json("/viewer").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["set_boundary_error"],
        "You must provide a zip archive containing a shapefile."
    );
    assert_eq!(app.api.call_count(), 0);
}
