//! Error types emitted by the Safestep CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use safestep_core::{PlannerConfigError, RoutePlanError};
use safestep_data::{OracleBuildError, SqliteSafetyStoreError};
use thiserror::Error;

/// Errors emitted by the Safestep CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A coordinate option could not be parsed.
    #[error("invalid {field} coordinate {value:?}: {reason}")]
    InvalidCoordinate {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
    /// The database path cannot hold a SQLite file.
    #[error("cannot use database path {path:?}: {source}")]
    DatabasePath {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening or writing the safety store failed.
    #[error(transparent)]
    Store(#[from] SqliteSafetyStoreError),
    /// Constructing the route oracle failed.
    #[error("failed to build route oracle for {base_url:?}: {source}")]
    BuildRouteOracle {
        base_url: String,
        #[source]
        source: OracleBuildError,
    },
    /// Planner settings were rejected.
    #[error("invalid planner settings: {0}")]
    PlannerConfig(#[from] PlannerConfigError),
    /// Planning finished without a usable route.
    #[error(transparent)]
    Plan(#[from] RoutePlanError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
