//! HTTP route oracle for the pedestrian route service.
//!
//! This module provides [`HttpRouteOracle`], an implementation of
//! [`safestep_core::RouteOracle`] that asks a TMap-compatible pedestrian
//! route endpoint for one walking route per call.
//!
//! # Architecture
//!
//! Each call POSTs the origin, destination and up to two via points as JSON
//! and reads the GeoJSON reply. The first feature's `totalTime` becomes the
//! route's travel time and the `LineString` features become its path. The
//! synchronous [`safestep_core::RouteOracle`] trait is implemented by
//! blocking on the async HTTP call internally.
//!
//! # Example
//!
//! ```no_run
//! use safestep_data::routing::{HttpRouteOracle, HttpRouteOracleConfig};
//! use std::time::Duration;
//!
//! let config = HttpRouteOracleConfig::new("https://apis.openapi.sk.com", "app-key")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("my-app/1.0");
//! let oracle = HttpRouteOracle::with_config(config)?;
//! # Ok::<(), safestep_data::routing::OracleBuildError>(())
//! ```

mod provider;
mod tmap;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpRouteOracle,
    HttpRouteOracleConfig, OracleBuildError,
};
