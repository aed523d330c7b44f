//! SQLite persistence for safety weights and hazard reports.
//!
//! [`SqliteSafetyStore`] implements both sides of the core store contract:
//! [`safestep_core::SafetyStore`] returns every row as a scored location and
//! [`safestep_core::HazardReportSink`] increments or inserts the weight at an
//! exact coordinate.

mod record;
mod schema;
mod sqlite;

pub use record::{InfrastructureStatus, RoadStructure, UnknownStatusCode};
pub use schema::{SCHEMA_VERSION, SchemaError, initialise_schema};
pub use sqlite::{SqliteSafetyStore, SqliteSafetyStoreError};
