//! Query an external pedestrian-routing service.
//!
//! The `RouteOracle` trait abstracts a service that, given an origin, a
//! destination and an ordered list of via points, returns a walking route
//! with its total travel time. Concrete HTTP clients live outside the core so
//! tests can substitute deterministic fakes.

mod error;
mod provider;

pub use error::RouteOracleError;
pub use provider::{RouteOracle, RouteResult};
