//! Reducers and output orientations accepted by the query endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Aggregation applied across an image stack or across pixels in a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    #[default]
    Median,
    Mosaic,
    Mode,
    Mean,
    Min,
    Max,
    Sum,
    Count,
    Product,
}

impl Reducer {
    pub const ALL: [Reducer; 9] = [
        Reducer::Median,
        Reducer::Mosaic,
        Reducer::Mode,
        Reducer::Mean,
        Reducer::Min,
        Reducer::Max,
        Reducer::Sum,
        Reducer::Count,
        Reducer::Product,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Reducer::Median => "median",
            Reducer::Mosaic => "mosaic",
            Reducer::Mode => "mode",
            Reducer::Mean => "mean",
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::Sum => "sum",
            Reducer::Count => "count",
            Reducer::Product => "product",
        }
    }

    /// Label shown in the reduction method control.
    pub fn label(&self) -> &'static str {
        match self {
            Reducer::Median => "Median",
            Reducer::Mosaic => "Mosaic",
            Reducer::Mode => "Mode",
            Reducer::Mean => "Mean",
            Reducer::Min => "Minimum",
            Reducer::Max => "Maximum",
            Reducer::Sum => "Sum",
            Reducer::Count => "Count",
            Reducer::Product => "Product",
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown reducer: {0}")]
pub struct UnknownReducer(pub String);

impl FromStr for Reducer {
    type Err = UnknownReducer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reducer::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownReducer(s.to_string()))
    }
}

/// Shape of the time series table returned by the REST API.
///
/// Mirrors the orientations of a pandas `DataFrame.to_dict`, which is what
/// API clients of this service already consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// `{column: {row: value}}`
    #[default]
    Dict,
    /// `{column: [values]}`
    List,
    /// `{index: [...], columns: [...], data: [[...]]}`
    Split,
    /// `[{column: value}]`
    Records,
    /// `{row: {column: value}}`
    Index,
}

impl Orientation {
    pub const ALL: [Orientation; 5] = [
        Orientation::Dict,
        Orientation::List,
        Orientation::Split,
        Orientation::Records,
        Orientation::Index,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Dict => "dict",
            Orientation::List => "list",
            Orientation::Split => "split",
            Orientation::Records => "records",
            Orientation::Index => "index",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown orientation: {0}")]
pub struct UnknownOrientation(pub String);

impl FromStr for Orientation {
    type Err = UnknownOrientation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Orientation::ALL
            .iter()
            .copied()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| UnknownOrientation(s.to_string()))
    }
}
