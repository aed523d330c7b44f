//! Route command implementation for the Safestep CLI.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use safestep_core::{
    DEFAULT_ALPHA, OptimalRoute, PlannerConfig, RouteOracle, RoutePlanner, RouteRequest,
    SafetyStore, ScoredLocation,
};
use safestep_data::routing::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use safestep_data::{HttpRouteOracle, HttpRouteOracleConfig, SqliteSafetyStore};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ALPHA, ARG_DATABASE, ARG_END, ARG_ROUTING_APP_KEY, ARG_ROUTING_BASE_URL, ARG_START,
    ARG_TIMEOUT_SECS, CliError, DEFAULT_DATABASE, ENV_ROUTE_APP_KEY, ENV_ROUTE_END,
    ENV_ROUTE_START, parse_lon_lat,
};

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "route",
    long_about = "Plan a walking route between two WGS84 coordinates. Up to \
                 two of the highest-weighted crossings near the trip are \
                 tried as detours; a detour is only taken when it stays \
                 within alpha times the direct travel time.",
    about = "Plan a safety-aware walking route"
)]
#[ortho_config(prefix = "SAFESTEP")]
pub(crate) struct RouteArgs {
    /// Origin as `LON,LAT`.
    #[arg(long = ARG_START, value_name = "lon,lat", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) start: Option<String>,
    /// Destination as `LON,LAT`.
    #[arg(long = ARG_END, value_name = "lon,lat", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) end: Option<String>,
    /// Maximum accepted ratio of detour time to direct time.
    #[arg(long = ARG_ALPHA, value_name = "ratio")]
    #[serde(default)]
    pub(crate) alpha: Option<f64>,
    /// Path to the SQLite safety database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Base URL of the pedestrian routing service.
    #[arg(long = ARG_ROUTING_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) routing_base_url: Option<String>,
    /// API key for the pedestrian routing service.
    #[arg(long = ARG_ROUTING_APP_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) routing_app_key: Option<String>,
    /// Per-request routing timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RouteConfig {
    pub(crate) start: Coord<f64>,
    pub(crate) end: Coord<f64>,
    pub(crate) alpha: f64,
    pub(crate) database: Utf8PathBuf,
    pub(crate) routing_base_url: String,
    pub(crate) routing_app_key: String,
    pub(crate) timeout: Duration,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let start = args.start.ok_or(CliError::MissingArgument {
            field: ARG_START,
            env: ENV_ROUTE_START,
        })?;
        let end = args.end.ok_or(CliError::MissingArgument {
            field: ARG_END,
            env: ENV_ROUTE_END,
        })?;
        let routing_app_key = args.routing_app_key.ok_or(CliError::MissingArgument {
            field: ARG_ROUTING_APP_KEY,
            env: ENV_ROUTE_APP_KEY,
        })?;

        Ok(Self {
            start: parse_lon_lat(ARG_START, &start)?,
            end: parse_lon_lat(ARG_END, &end)?,
            alpha: args.alpha.unwrap_or(DEFAULT_ALPHA),
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            routing_base_url: args
                .routing_base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            routing_app_key,
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

/// Plans a route for the current invocation.
pub(crate) trait RouteBackend {
    fn plan(&self, config: &RouteConfig) -> Result<OptimalRoute, CliError>;
}

/// Plans against the SQLite store and the HTTP routing service.
pub(crate) struct DefaultRouteBackend;

impl RouteBackend for DefaultRouteBackend {
    fn plan(&self, config: &RouteConfig) -> Result<OptimalRoute, CliError> {
        safestep_fs::prepare_file_target(&config.database).map_err(|source| {
            CliError::DatabasePath {
                path: config.database.clone(),
                source,
            }
        })?;
        let store = SqliteSafetyStore::open(config.database.as_std_path())?;
        let oracle_config = HttpRouteOracleConfig::new(
            config.routing_base_url.clone(),
            config.routing_app_key.clone(),
        )
        .with_timeout(config.timeout);
        let oracle = HttpRouteOracle::with_config(oracle_config).map_err(|source| {
            CliError::BuildRouteOracle {
                base_url: config.routing_base_url.clone(),
                source,
            }
        })?;
        plan_route(config, oracle, &store)
    }
}

/// Run the planner for `config` over `oracle` and a fresh snapshot of `store`.
pub(crate) fn plan_route<O, S>(
    config: &RouteConfig,
    oracle: O,
    store: &S,
) -> Result<OptimalRoute, CliError>
where
    O: RouteOracle,
    S: SafetyStore + ?Sized,
{
    let request = RouteRequest::new(config.start, config.end)?;
    let planner_config = PlannerConfig::default().with_alpha(config.alpha);
    let planner = RoutePlanner::with_config(oracle, planner_config)?;
    let chosen = planner.plan_from_store(&request, store)?;
    log::info!(
        "chose {} route with {} waypoint(s)",
        if chosen.is_detour() { "detour" } else { "direct" },
        chosen.via.len()
    );
    Ok(chosen)
}

/// JSON document printed by `safestep route`.
#[derive(Debug, Serialize)]
pub(crate) struct RouteOutput<'a> {
    pub(crate) via: &'a [ScoredLocation],
    pub(crate) total_time_secs: Option<f64>,
    pub(crate) path: Vec<[f64; 2]>,
    pub(crate) payload: &'a serde_json::Value,
}

impl<'a> From<&'a OptimalRoute> for RouteOutput<'a> {
    fn from(chosen: &'a OptimalRoute) -> Self {
        Self {
            via: &chosen.via,
            total_time_secs: chosen.route.total_time.map(|time| time.as_secs_f64()),
            path: chosen
                .route
                .path
                .iter()
                .map(|coord| [coord.x, coord.y])
                .collect(),
            payload: &chosen.route.payload,
        }
    }
}

pub(crate) fn run_route(args: RouteArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_route_with(args, &DefaultRouteBackend, &mut stdout)
}

pub(crate) fn run_route_with(
    args: RouteArgs,
    backend: &dyn RouteBackend,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let chosen = backend.plan(&config)?;
    write_json(writer, &RouteOutput::from(&chosen))
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RouteConfig, CliError> {
    let merged = RouteArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RouteConfig::try_from(merged)
}
