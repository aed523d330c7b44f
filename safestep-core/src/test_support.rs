//! In-memory store and scripted oracle used by unit and behaviour tests.

use std::convert::Infallible;
use std::sync::{Mutex, PoisonError};

use geo::Coord;

use crate::{
    DEFAULT_REPORT_INCREMENT, HazardReportSink, ReportOutcome, RouteOracle, RouteOracleError,
    RouteResult, SafetyStore, ScoredLocation,
};

/// In-memory [`SafetyStore`] and [`HazardReportSink`].
///
/// Performs linear scans and is intended only for small datasets.
#[derive(Default, Debug)]
pub struct MemoryStore {
    locations: Mutex<Vec<ScoredLocation>>,
}

impl MemoryStore {
    /// Create a store from a collection of scored locations.
    pub fn with_locations<I>(locations: I) -> Self
    where
        I: IntoIterator<Item = ScoredLocation>,
    {
        Self {
            locations: Mutex::new(locations.into_iter().collect()),
        }
    }
}

impl SafetyStore for MemoryStore {
    type Error = Infallible;

    fn load_scored_locations(&self) -> Result<Vec<ScoredLocation>, Self::Error> {
        let guard = self.locations.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }
}

impl HazardReportSink for MemoryStore {
    type Error = Infallible;

    #[expect(
        clippy::float_arithmetic,
        reason = "reports add a fixed increment to the stored weight"
    )]
    fn report_hazard(&self, location: Coord<f64>) -> Result<ReportOutcome, Self::Error> {
        let mut guard = self.locations.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = guard.iter_mut().find(|entry| entry.location == location) {
            existing.weight += DEFAULT_REPORT_INCREMENT;
            return Ok(ReportOutcome::Incremented {
                weight: existing.weight,
            });
        }
        guard.push(ScoredLocation {
            location,
            weight: DEFAULT_REPORT_INCREMENT,
        });
        Ok(ReportOutcome::Inserted {
            weight: DEFAULT_REPORT_INCREMENT,
        })
    }
}

/// [`RouteOracle`] answering from a fixed script keyed by via list.
///
/// Unscripted requests fail with [`RouteOracleError::NetworkError`]. Every
/// request is recorded so tests can assert how many calls were made.
#[derive(Debug, Default)]
pub struct ScriptedRouteOracle {
    script: Vec<(Vec<Coord<f64>>, Result<RouteResult, RouteOracleError>)>,
    calls: Mutex<Vec<Vec<Coord<f64>>>>,
}

impl ScriptedRouteOracle {
    /// Answer requests through `via` with `route`.
    #[must_use]
    pub fn with_route(mut self, via: &[Coord<f64>], route: RouteResult) -> Self {
        self.script.push((via.to_vec(), Ok(route)));
        self
    }

    /// Answer requests through `via` with `error`.
    #[must_use]
    pub fn with_error(mut self, via: &[Coord<f64>], error: RouteOracleError) -> Self {
        self.script.push((via.to_vec(), Err(error)));
        self
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Via lists of every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<Vec<Coord<f64>>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RouteOracle for ScriptedRouteOracle {
    fn request_route(
        &self,
        _start: Coord<f64>,
        _end: Coord<f64>,
        via: &[Coord<f64>],
    ) -> Result<RouteResult, RouteOracleError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(via.to_vec());
        self.script
            .iter()
            .find(|(scripted, _)| scripted.as_slice() == via)
            .map_or_else(
                || {
                    Err(RouteOracleError::NetworkError {
                        url: "scripted://route".to_owned(),
                        message: format!("no scripted response for {} via point(s)", via.len()),
                    })
                },
                |(_, outcome)| outcome.clone(),
            )
    }
}
