//! Concrete collaborators for the Safestep route planner.
//!
//! Responsibilities:
//! - Talk to the pedestrian routing service ([`routing`]).
//! - Persist safety weights and hazard reports ([`store`]).
//!
//! Boundaries:
//! - Do not encode planning rules (live in `safestep-core`).
//! - Keep blocking I/O behind the synchronous core traits.
//!
//! Invariants:
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod routing;
pub mod store;

pub use routing::{HttpRouteOracle, HttpRouteOracleConfig, OracleBuildError};
pub use store::{
    InfrastructureStatus, RoadStructure, SqliteSafetyStore, SqliteSafetyStoreError,
};
