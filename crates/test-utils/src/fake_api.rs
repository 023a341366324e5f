//! In-memory [`EarthEngineApi`] that records every call.
//!
//! Assets live in a set: exports add to it, deletes remove from it, so
//! tests can assert on the remote state after a sequence of operations.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use ee_client::{EarthEngineApi, Expression, GatewayError, GatewayResult, MapRequest};
use serde_json::Value;

/// A recorded API call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CreateMap(Expression),
    ComputeValue(Expression),
    ExportTable {
        asset_id: String,
        expression: Expression,
    },
    DeleteAsset(String),
    AssetExists(String),
    CreateFolder(String),
}

pub struct RecordingEarthEngineApi {
    calls: Mutex<Vec<ApiCall>>,
    assets: Mutex<BTreeSet<String>>,
    compute_results: Mutex<VecDeque<GatewayResult<Value>>>,
    default_compute: Value,
    map_error: Option<GatewayError>,
    export_error: Option<GatewayError>,
}

impl Default for RecordingEarthEngineApi {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingEarthEngineApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            assets: Mutex::new(BTreeSet::new()),
            compute_results: Mutex::new(VecDeque::new()),
            default_compute: crate::fixtures::results::snow_cover_pairs(),
            map_error: None,
            export_error: None,
        }
    }

    /// Start with `asset_id` already present.
    pub fn with_asset(self, asset_id: &str) -> Self {
        self.assets.lock().unwrap().insert(asset_id.to_string());
        self
    }

    /// Queue a result for the next `compute_value` call. Once the queue is
    /// empty, calls return the default snow cover pairs.
    pub fn with_compute_result(self, result: GatewayResult<Value>) -> Self {
        self.compute_results.lock().unwrap().push_back(result);
        self
    }

    pub fn failing_maps(mut self, error: GatewayError) -> Self {
        self.map_error = Some(error);
        self
    }

    pub fn failing_exports(mut self, error: GatewayError) -> Self {
        self.export_error = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn assets(&self) -> BTreeSet<String> {
        self.assets.lock().unwrap().clone()
    }

    pub fn has_asset(&self, asset_id: &str) -> bool {
        self.assets.lock().unwrap().contains(asset_id)
    }

    /// Expressions sent to `create_map`, in call order.
    pub fn map_expressions(&self) -> Vec<Expression> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::CreateMap(expression) => Some(expression),
                _ => None,
            })
            .collect()
    }

    /// Expressions sent to `compute_value`, in call order.
    pub fn compute_expressions(&self) -> Vec<Expression> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::ComputeValue(expression) => Some(expression),
                _ => None,
            })
            .collect()
    }

    /// Asset ids exported to, in call order.
    pub fn exports(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::ExportTable { asset_id, .. } => Some(asset_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl EarthEngineApi for RecordingEarthEngineApi {
    async fn create_map(&self, request: &MapRequest) -> GatewayResult<String> {
        self.record(ApiCall::CreateMap(request.expression.clone()));
        match &self.map_error {
            Some(e) => Err(e.clone()),
            None => Ok(crate::fixtures::results::MAP_NAME.to_string()),
        }
    }

    async fn compute_value(&self, expression: &Expression) -> GatewayResult<Value> {
        self.record(ApiCall::ComputeValue(expression.clone()));
        let queued = self.compute_results.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(self.default_compute.clone()))
    }

    async fn export_table(
        &self,
        expression: &Expression,
        asset_id: &str,
        _description: &str,
    ) -> GatewayResult<()> {
        self.record(ApiCall::ExportTable {
            asset_id: asset_id.to_string(),
            expression: expression.clone(),
        });
        if let Some(e) = &self.export_error {
            return Err(e.clone());
        }
        self.assets.lock().unwrap().insert(asset_id.to_string());
        Ok(())
    }

    async fn delete_asset(&self, asset_id: &str) -> GatewayResult<()> {
        self.record(ApiCall::DeleteAsset(asset_id.to_string()));
        if self.assets.lock().unwrap().remove(asset_id) {
            Ok(())
        } else {
            Err(GatewayError::Api {
                status: 404,
                message: format!("Asset '{}' not found.", asset_id),
            })
        }
    }

    async fn asset_exists(&self, asset_id: &str) -> GatewayResult<bool> {
        self.record(ApiCall::AssetExists(asset_id.to_string()));
        Ok(self.has_asset(asset_id))
    }

    async fn create_folder(&self, asset_id: &str) -> GatewayResult<()> {
        self.record(ApiCall::CreateFolder(asset_id.to_string()));
        self.assets.lock().unwrap().insert(asset_id.to_string());
        Ok(())
    }
}
