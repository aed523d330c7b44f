//! End-to-end route planning over a scored-location snapshot.
//!
//! The planner wires the pieces together: it sizes a search circle around
//! the trip, keeps the safest locations inside it and hands them to the
//! [`RouteOptimizer`]. The snapshot is an explicit argument so planning is a
//! pure function of its inputs plus the oracle.

use geo::Coord;
use thiserror::Error;

use crate::{
    CandidateSelector, Circle, DEFAULT_ALPHA, DEFAULT_CIRCLE_FACTOR, MAX_DETOUR_WAYPOINTS,
    OptimalRoute, OptimizerConfig, RouteOptimizer, RouteOracle, RoutePlanError, SafetyStore,
    ScoredLocation,
};

/// A validated origin/destination pair.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use safestep_core::RouteRequest;
///
/// let request = RouteRequest::new(Coord { x: 126.97, y: 37.56 }, Coord { x: 126.99, y: 37.57 })?;
/// assert_eq!(request.start().x, 126.97);
/// # Ok::<(), safestep_core::RoutePlanError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RouteRequest {
    start: Coord<f64>,
    end: Coord<f64>,
}

impl RouteRequest {
    /// Validate both endpoints and construct a request.
    ///
    /// # Errors
    ///
    /// Returns [`RoutePlanError::InvalidInput`] when a coordinate is not
    /// finite or lies outside `[-180, 180] x [-90, 90]`.
    pub fn new(start: Coord<f64>, end: Coord<f64>) -> Result<Self, RoutePlanError> {
        validate_coordinate("start", start)?;
        validate_coordinate("end", end)?;
        Ok(Self { start, end })
    }

    /// Origin of the trip.
    #[must_use]
    pub const fn start(&self) -> Coord<f64> {
        self.start
    }

    /// Destination of the trip.
    #[must_use]
    pub const fn end(&self) -> Coord<f64> {
        self.end
    }
}

fn validate_coordinate(field: &'static str, coord: Coord<f64>) -> Result<(), RoutePlanError> {
    let valid = coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y);
    if valid {
        Ok(())
    } else {
        Err(RoutePlanError::InvalidInput {
            field,
            x: coord.x,
            y: coord.y,
        })
    }
}

/// Errors returned by [`PlannerConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PlannerConfigError {
    /// `alpha` was below one or not finite.
    #[error("alpha must be a finite number of at least 1.0, got {0}")]
    InvalidAlpha(f64),
    /// The circle factor was negative or not finite.
    #[error("circle factor must be a finite, non-negative number, got {0}")]
    InvalidCircleFactor(f64),
}

/// Configuration for [`RoutePlanner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    /// Scale applied to the start/end distance when sizing the search circle.
    pub circle_factor: f64,
    /// Maximum ratio of detour time to direct time.
    pub alpha: f64,
    /// Number of candidates handed to the optimiser, at most two.
    pub candidate_limit: usize,
    /// Request detour permutations concurrently.
    pub parallel: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            circle_factor: DEFAULT_CIRCLE_FACTOR,
            alpha: DEFAULT_ALPHA,
            candidate_limit: MAX_DETOUR_WAYPOINTS,
            parallel: true,
        }
    }
}

impl PlannerConfig {
    /// Set the ceiling multiplier.
    #[must_use]
    pub const fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the circle scale factor.
    #[must_use]
    pub const fn with_circle_factor(mut self, circle_factor: f64) -> Self {
        self.circle_factor = circle_factor;
        self
    }

    /// Enable or disable concurrent detour requests.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the numeric settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerConfigError`] for a non-finite or sub-unit `alpha`
    /// or a negative or non-finite circle factor.
    pub fn validate(&self) -> Result<(), PlannerConfigError> {
        if !self.alpha.is_finite() || self.alpha < 1.0 {
            return Err(PlannerConfigError::InvalidAlpha(self.alpha));
        }
        if !self.circle_factor.is_finite() || self.circle_factor < 0.0 {
            return Err(PlannerConfigError::InvalidCircleFactor(self.circle_factor));
        }
        Ok(())
    }
}

/// Plans safety-aware walking routes.
#[derive(Debug)]
pub struct RoutePlanner<O> {
    optimizer: RouteOptimizer<O>,
    selector: CandidateSelector,
    circle_factor: f64,
}

impl<O> RoutePlanner<O>
where
    O: RouteOracle,
{
    /// Construct a planner using default configuration.
    pub fn new(oracle: O) -> Self {
        Self {
            optimizer: RouteOptimizer::new(oracle),
            selector: CandidateSelector::default(),
            circle_factor: DEFAULT_CIRCLE_FACTOR,
        }
    }

    /// Construct a planner with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerConfigError`] when `config` fails validation.
    pub fn with_config(oracle: O, config: PlannerConfig) -> Result<Self, PlannerConfigError> {
        config.validate()?;
        let optimizer_config = OptimizerConfig::default()
            .with_alpha(config.alpha)
            .with_parallel(config.parallel);
        Ok(Self {
            optimizer: RouteOptimizer::with_config(oracle, optimizer_config),
            selector: CandidateSelector::new(config.candidate_limit),
            circle_factor: config.circle_factor,
        })
    }

    /// Search circle for `request`.
    #[must_use]
    pub fn search_circle(&self, request: &RouteRequest) -> Circle {
        Circle::enclosing(request.start(), request.end(), self.circle_factor)
    }

    /// Ranked detour candidates for `request` drawn from `snapshot`.
    #[must_use]
    pub fn candidates(
        &self,
        request: &RouteRequest,
        snapshot: &[ScoredLocation],
    ) -> Vec<ScoredLocation> {
        let circle = self.search_circle(request);
        self.selector.select(snapshot, &circle)
    }

    /// Plan a route for `request` using the supplied snapshot.
    ///
    /// # Errors
    ///
    /// See [`RouteOptimizer::find_optimal_route`].
    pub fn plan(
        &self,
        request: &RouteRequest,
        snapshot: &[ScoredLocation],
    ) -> Result<OptimalRoute, RoutePlanError> {
        let candidates = self.candidates(request, snapshot);
        self.optimizer
            .find_optimal_route(request.start(), request.end(), &candidates)
    }

    /// Read a fresh snapshot from `store` and plan a route for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutePlanError::Store`] when the snapshot cannot be read,
    /// otherwise as [`Self::plan`].
    pub fn plan_from_store<S>(
        &self,
        request: &RouteRequest,
        store: &S,
    ) -> Result<OptimalRoute, RoutePlanError>
    where
        S: SafetyStore + ?Sized,
    {
        let snapshot = store
            .load_scored_locations()
            .map_err(|err| RoutePlanError::Store(Box::new(err)))?;
        self.plan(request, &snapshot)
    }
}
