//! Time series tables returned by the gateway.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use viewer_common::Orientation;

use crate::error::{GatewayError, GatewayResult};

pub const TIME_COLUMN: &str = "Time";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Acquisition time, epoch milliseconds.
    pub time_ms: i64,
    /// `None` where the region had no valid pixels.
    pub value: Option<f64>,
}

/// One series per query geometry member, sorted by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub column: String,
    pub points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    pub fn new(index_name: &str, mut points: Vec<TimeSeriesPoint>) -> Self {
        points.sort_by_key(|p| p.time_ms);
        Self {
            column: column_name(index_name),
            points,
        }
    }

    /// Decode the `[[time, value], ...]` array computed for one geometry.
    pub fn from_computed(index_name: &str, result: &JsonValue) -> GatewayResult<Self> {
        let rows = match result {
            JsonValue::Array(rows) => rows,
            JsonValue::Null => return Ok(Self::new(index_name, Vec::new())),
            other => {
                return Err(GatewayError::Decode(format!(
                    "expected an array of [time, value] pairs, got {}",
                    other
                )))
            }
        };

        let points = rows
            .iter()
            .map(|row| {
                let pair = row.as_array().filter(|pair| pair.len() == 2).ok_or_else(|| {
                    GatewayError::Decode(format!("expected a [time, value] pair, got {}", row))
                })?;
                let time_ms = pair[0]
                    .as_f64()
                    .ok_or_else(|| GatewayError::Decode(format!("invalid time {}", pair[0])))?;
                let value = match &pair[1] {
                    JsonValue::Null => None,
                    v => Some(
                        v.as_f64()
                            .ok_or_else(|| GatewayError::Decode(format!("invalid value {}", v)))?,
                    ),
                };
                Ok(TimeSeriesPoint {
                    time_ms: time_ms as i64,
                    value,
                })
            })
            .collect::<GatewayResult<Vec<_>>>()?;

        Ok(Self::new(index_name, points))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Render the table with columns `Time` and the value column.
    pub fn oriented(&self, orient: Orientation) -> JsonValue {
        let names = [TIME_COLUMN, self.column.as_str()];
        let row = |p: &TimeSeriesPoint| -> Map<String, JsonValue> {
            let mut map = Map::new();
            map.insert(TIME_COLUMN.to_string(), json!(p.time_ms));
            map.insert(self.column.clone(), json!(p.value));
            map
        };

        match orient {
            Orientation::Dict => {
                let times: Map<String, JsonValue> = self
                    .points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (i.to_string(), json!(p.time_ms)))
                    .collect();
                let values: Map<String, JsonValue> = self
                    .points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (i.to_string(), json!(p.value)))
                    .collect();
                self.columns(json!(times), json!(values))
            }
            Orientation::List => {
                let times: Vec<i64> = self.points.iter().map(|p| p.time_ms).collect();
                let values: Vec<Option<f64>> = self.points.iter().map(|p| p.value).collect();
                self.columns(json!(times), json!(values))
            }
            Orientation::Split => json!({
                "index": (0..self.points.len()).collect::<Vec<_>>(),
                "columns": names,
                "data": self
                    .points
                    .iter()
                    .map(|p| json!([p.time_ms, p.value]))
                    .collect::<Vec<_>>(),
            }),
            Orientation::Records => {
                JsonValue::Array(self.points.iter().map(|p| JsonValue::Object(row(p))).collect())
            }
            Orientation::Index => JsonValue::Object(
                self.points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (i.to_string(), JsonValue::Object(row(p))))
                    .collect(),
            ),
        }
    }

    fn columns(&self, times: JsonValue, values: JsonValue) -> JsonValue {
        let mut map = Map::new();
        map.insert(TIME_COLUMN.to_string(), times);
        map.insert(self.column.clone(), values);
        JsonValue::Object(map)
    }
}

/// Display name of an index band: underscores become spaces.
pub fn column_name(index_name: &str) -> String {
    index_name.replace('_', " ")
}
