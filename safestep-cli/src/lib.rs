//! Command-line interface for the Safestep route planner.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use geo::Coord;

mod error;
mod report;
mod route;

pub use error::CliError;

use report::{ReportArgs, run_report};
use route::{RouteArgs, run_route};

pub(crate) const ARG_START: &str = "start";
pub(crate) const ARG_END: &str = "end";
pub(crate) const ARG_ALPHA: &str = "alpha";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_ROUTING_BASE_URL: &str = "routing-base-url";
pub(crate) const ARG_ROUTING_APP_KEY: &str = "routing-app-key";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_AT: &str = "at";
pub(crate) const ENV_ROUTE_START: &str = "SAFESTEP_CMDS_ROUTE_START";
pub(crate) const ENV_ROUTE_END: &str = "SAFESTEP_CMDS_ROUTE_END";
pub(crate) const ENV_ROUTE_APP_KEY: &str = "SAFESTEP_CMDS_ROUTE_ROUTING_APP_KEY";
pub(crate) const ENV_REPORT_AT: &str = "SAFESTEP_CMDS_REPORT_AT";

/// Database used when neither flag, environment nor file names one.
pub(crate) const DEFAULT_DATABASE: &str = "safestep.sqlite";

/// Run the Safestep CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Route(args) => run_route(args),
        Command::Report(args) => run_report(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "safestep",
    about = "Safety-aware pedestrian route planning",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a walking route that favours safer crossings.
    Route(RouteArgs),
    /// Record a hazard report at a coordinate.
    Report(ReportArgs),
}

/// Parse a `LON,LAT` pair into a WGS84 coordinate.
pub(crate) fn parse_lon_lat(field: &'static str, value: &str) -> Result<Coord<f64>, CliError> {
    let invalid = |reason: &'static str| CliError::InvalidCoordinate {
        field,
        value: value.to_owned(),
        reason,
    };
    let (lon, lat) = value
        .split_once(',')
        .ok_or_else(|| invalid("expected LON,LAT"))?;
    let x: f64 = lon
        .trim()
        .parse()
        .map_err(|_| invalid("longitude is not a number"))?;
    let y: f64 = lat
        .trim()
        .parse()
        .map_err(|_| invalid("latitude is not a number"))?;
    if !x.is_finite() || !(-180.0..=180.0).contains(&x) {
        return Err(invalid("longitude must be within [-180, 180]"));
    }
    if !y.is_finite() || !(-90.0..=90.0).contains(&y) {
        return Err(invalid("latitude must be within [-90, 90]"));
    }
    Ok(Coord { x, y })
}

#[cfg(test)]
mod tests;
