//! Errors surfaced by route planning.

use thiserror::Error;

use crate::RouteOracleError;

/// Errors returned by [`crate::RouteOptimizer::find_optimal_route`] and
/// [`crate::RoutePlanner`].
///
/// Callers see either a usable route or one of these. Failures of individual
/// detour permutations never appear here; they are dropped by the optimiser.
#[derive(Debug, Error)]
pub enum RoutePlanError {
    /// A coordinate was malformed. Raised before any oracle call.
    #[error("{field} coordinate ({x}, {y}) is not a valid WGS84 position")]
    InvalidInput {
        /// Which endpoint was rejected.
        field: &'static str,
        /// Longitude as supplied.
        x: f64,
        /// Latitude as supplied.
        y: f64,
    },
    /// The direct route could not be fetched, so no cost ceiling exists.
    #[error("no route available between origin and destination: {source}")]
    NoBaselineRoute {
        /// Oracle failure for the direct request.
        #[source]
        source: RouteOracleError,
    },
    /// The best detour was slower than the permitted ceiling.
    #[error(
        "no acceptable route: best detour takes {best_secs}s, ceiling is {ceiling_secs}s"
    )]
    NoAcceptableDetour {
        /// Travel time of the fastest successful detour.
        best_secs: f64,
        /// `alpha` times the direct travel time.
        ceiling_secs: f64,
    },
    /// The scored-location snapshot could not be read.
    #[error("failed to read scored locations: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RoutePlanError {
    /// Whether the error means "no route found" rather than bad input or a
    /// storage failure.
    #[must_use]
    pub const fn is_no_route(&self) -> bool {
        matches!(
            self,
            Self::NoBaselineRoute { .. } | Self::NoAcceptableDetour { .. }
        )
    }
}
