//! Report command implementation for the Safestep CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use safestep_core::{HazardReportSink, ReportOutcome};
use safestep_data::SqliteSafetyStore;
use serde::{Deserialize, Serialize};

use crate::route::write_json;
use crate::{ARG_AT, ARG_DATABASE, CliError, DEFAULT_DATABASE, ENV_REPORT_AT, parse_lon_lat};

/// CLI arguments for the `report` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "report",
    long_about = "Record a hazard at an exact coordinate. An existing \
                 location gains 0.5 weight; otherwise a new location is \
                 stored with weight 0.5.",
    about = "Record a hazard report"
)]
#[ortho_config(prefix = "SAFESTEP")]
pub(crate) struct ReportArgs {
    /// Hazard position as `LON,LAT`.
    #[arg(long = ARG_AT, value_name = "lon,lat", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) at: Option<String>,
    /// Path to the SQLite safety database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ReportArgs {
    fn into_config(self) -> Result<ReportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ReportConfig::try_from(merged)
    }
}

/// Resolved `report` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReportConfig {
    pub(crate) at: Coord<f64>,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<ReportArgs> for ReportConfig {
    type Error = CliError;

    fn try_from(args: ReportArgs) -> Result<Self, Self::Error> {
        let at = args.at.ok_or(CliError::MissingArgument {
            field: ARG_AT,
            env: ENV_REPORT_AT,
        })?;
        Ok(Self {
            at: parse_lon_lat(ARG_AT, &at)?,
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
        })
    }
}

/// JSON document printed by `safestep report`.
#[derive(Debug, Serialize)]
struct ReportOutput {
    longitude: f64,
    latitude: f64,
    #[serde(flatten)]
    outcome: ReportOutcome,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_report_with(args.into_config()?, &mut stdout)
}

pub(crate) fn run_report_with(config: ReportConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    safestep_fs::prepare_file_target(&config.database).map_err(|source| {
        CliError::DatabasePath {
            path: config.database.clone(),
            source,
        }
    })?;
    let store = SqliteSafetyStore::open(config.database.as_std_path())?;
    let outcome = store.report_hazard(config.at)?;
    write_json(
        writer,
        &ReportOutput {
            longitude: config.at.x,
            latitude: config.at.y,
            outcome,
        },
    )
}
