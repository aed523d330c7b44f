//! Core domain logic for the Safestep pedestrian router.
//!
//! Safestep proposes walking routes that favour intersections with
//! accessible infrastructure over the raw shortest path. This crate holds
//! the algorithmic part and nothing that performs I/O:
//!
//! - [`geometry`]: the search circle around a trip and point-in-circle
//!   filtering.
//! - [`selection`]: ranking scored locations by safety weight.
//! - [`oracle`]: the [`RouteOracle`] capability a routing service provides.
//! - [`optimizer`]: choosing between the direct route and detours under a
//!   travel-time ceiling.
//! - [`planner`]: the whole pipeline over an explicit snapshot.
//! - [`store`]: the read and report sides of persisted safety weights.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod geometry;
pub mod location;
pub mod optimizer;
pub mod oracle;
pub mod planner;
pub mod selection;
pub mod store;
#[doc(hidden)]
pub mod test_support;

pub use error::RoutePlanError;
pub use geometry::{Circle, DEFAULT_CIRCLE_FACTOR, midpoint_and_circle, points_within_circle};
pub use location::{Positioned, ScoredLocation, ScoredLocationError};
pub use optimizer::{
    DEFAULT_ALPHA, OptimalRoute, OptimizerConfig, RouteOptimizer, find_optimal_route,
};
pub use oracle::{RouteOracle, RouteOracleError, RouteResult};
pub use planner::{PlannerConfig, PlannerConfigError, RoutePlanner, RouteRequest};
pub use selection::{CandidateSelector, MAX_DETOUR_WAYPOINTS, select_top_safety};
pub use store::{DEFAULT_REPORT_INCREMENT, HazardReportSink, ReportOutcome, SafetyStore};
