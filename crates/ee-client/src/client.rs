//! Earth Engine REST v1 client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, instrument, warn};

use crate::auth::{Credentials, TokenSource};
use crate::error::{GatewayError, GatewayResult};
use crate::expression::Expression;

pub const DEFAULT_API_BASE: &str = "https://earthengine.googleapis.com/v1";

/// Primitive operations against the Earth Engine REST API.
///
/// Implementations must be cheap to share; the service holds one behind an
/// `Arc` for its whole lifetime.
#[async_trait]
pub trait EarthEngineApi: Send + Sync {
    /// Register a map for tiling and return its resource name.
    async fn create_map(&self, request: &MapRequest) -> GatewayResult<String>;

    /// Evaluate an expression and return its value.
    async fn compute_value(&self, expression: &Expression) -> GatewayResult<JsonValue>;

    /// Start a batch export of a feature collection to a table asset.
    async fn export_table(
        &self,
        expression: &Expression,
        asset_id: &str,
        description: &str,
    ) -> GatewayResult<()>;

    async fn delete_asset(&self, asset_id: &str) -> GatewayResult<()>;

    async fn asset_exists(&self, asset_id: &str) -> GatewayResult<bool>;

    async fn create_folder(&self, asset_id: &str) -> GatewayResult<()>;
}

/// Body of a `maps.create` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRequest {
    pub expression: Expression,
    pub file_format: String,
}

impl MapRequest {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            file_format: "AUTO_JPEG_PNG".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Cloud project billed for requests.
    pub project: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            project: "earthengine-legacy".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ComputeResponse {
    #[serde(default)]
    result: JsonValue,
}

/// HTTP implementation of [`EarthEngineApi`].
pub struct HttpEarthEngineClient {
    http: Client,
    config: ClientConfig,
    tokens: TokenSource,
}

impl HttpEarthEngineClient {
    pub fn new(config: ClientConfig, credentials: Credentials) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| GatewayError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let tokens = TokenSource::new(credentials, http.clone());
        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    fn project_url(&self, method: &str) -> String {
        format!(
            "{}/projects/{}/{}",
            self.config.api_base, self.config.project, method
        )
    }

    fn asset_url(&self, asset_id: &str) -> String {
        format!("{}/{}", self.config.api_base, asset_id)
    }

    /// Send an authorised request, mapping non-success statuses to errors.
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> GatewayResult<Response> {
        let token = self.tokens.token().await?;

        let start = Instant::now();
        let result = request.bearer_auth(token).send().await;
        histogram!("ee_request_duration_seconds", "operation" => operation)
            .record(start.elapsed().as_secs_f64());
        counter!("ee_requests_total", "operation" => operation).increment(1);

        let response = result.map_err(|e| {
            counter!("ee_request_errors_total", "operation" => operation).increment(1);
            GatewayError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        counter!("ee_request_errors_total", "operation" => operation).increment(1);
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        })
    }
}

#[async_trait]
impl EarthEngineApi for HttpEarthEngineClient {
    #[instrument(skip(self, request))]
    async fn create_map(&self, request: &MapRequest) -> GatewayResult<String> {
        let response = self
            .send("create_map", self.http.post(self.project_url("maps")).json(request))
            .await?;
        let map: MapResponse = response.json().await?;
        debug!(name = %map.name, "Created map");
        Ok(map.name)
    }

    #[instrument(skip(self, expression))]
    async fn compute_value(&self, expression: &Expression) -> GatewayResult<JsonValue> {
        let body = json!({ "expression": expression });
        let response = self
            .send(
                "compute_value",
                self.http.post(self.project_url("value:compute")).json(&body),
            )
            .await?;
        let value: ComputeResponse = response.json().await?;
        Ok(value.result)
    }

    #[instrument(skip(self, expression))]
    async fn export_table(
        &self,
        expression: &Expression,
        asset_id: &str,
        description: &str,
    ) -> GatewayResult<()> {
        let body = json!({
            "expression": expression,
            "description": description,
            "assetExportOptions": {
                "earthEngineDestination": { "name": asset_id }
            }
        });
        self.send(
            "export_table",
            self.http.post(self.project_url("table:export")).json(&body),
        )
        .await?;
        debug!(asset_id, "Started table export");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_asset(&self, asset_id: &str) -> GatewayResult<()> {
        self.send("delete_asset", self.http.delete(self.asset_url(asset_id)))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn asset_exists(&self, asset_id: &str) -> GatewayResult<bool> {
        match self
            .send("get_asset", self.http.get(self.asset_url(asset_id)))
            .await
        {
            Ok(_) => Ok(true),
            Err(GatewayError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn create_folder(&self, asset_id: &str) -> GatewayResult<()> {
        let prefix = format!("projects/{}/assets/", self.config.project);
        let relative = asset_id.strip_prefix(&prefix).unwrap_or(asset_id);
        let result = self
            .send(
                "create_folder",
                self.http
                    .post(self.project_url("assets"))
                    .query(&[("assetId", relative)])
                    .json(&json!({ "type": "FOLDER" })),
            )
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(GatewayError::Api { status: 409, .. }) => {
                warn!(asset_id, "Folder already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Pull `error.message` out of a REST error body, falling back to the body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
