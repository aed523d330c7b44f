//! Facade crate for the Safestep pedestrian route planner.
//!
//! This crate re-exports the core domain types and exposes the HTTP route
//! oracle and SQLite safety store behind feature flags.

#![forbid(unsafe_code)]

pub use safestep_core::{
    Circle, HazardReportSink, OptimalRoute, OptimizerConfig, PlannerConfig, PlannerConfigError,
    Positioned, ReportOutcome, RouteOptimizer, RouteOracle, RouteOracleError, RoutePlanError,
    RoutePlanner, RouteRequest, RouteResult, SafetyStore, ScoredLocation, ScoredLocationError,
    find_optimal_route, midpoint_and_circle, points_within_circle, select_top_safety,
};

#[cfg(feature = "http-oracle")]
pub use safestep_data::routing::{HttpRouteOracle, HttpRouteOracleConfig, OracleBuildError};

#[cfg(feature = "store-sqlite")]
pub use safestep_data::store::{
    InfrastructureStatus, RoadStructure, SqliteSafetyStore, SqliteSafetyStoreError,
};
