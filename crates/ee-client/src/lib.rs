//! Google Earth Engine access for the viewer.
//!
//! - [`expression`]: builder for REST expression graphs
//! - [`client`]: the [`EarthEngineApi`] trait and its HTTP implementation
//! - [`auth`]: service account, static token and metadata server credentials
//! - [`gateway`]: tile URLs, region time series and boundary assets
//! - [`series`]: time series tables and their JSON orientations

pub mod auth;
pub mod client;
pub mod error;
pub mod expression;
pub mod gateway;
pub mod series;

pub use auth::{Credentials, TokenSource};
pub use client::{ClientConfig, EarthEngineApi, HttpEarthEngineClient, MapRequest};
pub use error::{GatewayError, GatewayResult};
pub use expression::{Expression, Value};
pub use gateway::ImageryGateway;
pub use series::{TimeSeries, TimeSeriesPoint};
