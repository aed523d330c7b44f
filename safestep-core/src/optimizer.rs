//! Choose between the direct route and safety-aware detours.
//!
//! The optimiser asks the oracle for the direct route first. That baseline
//! is mandatory: its travel time sets the ceiling any detour must respect.
//! With at least two candidates `a` and `b` it then requests the four
//! order-sensitive detours `[a]`, `[b]`, `[a, b]` and `[b, a]`, keeps the
//! ones that succeeded and picks the fastest. A detour slower than
//! `alpha * baseline` is rejected outright rather than silently replaced by
//! the baseline.

use std::thread;

use geo::Coord;

use crate::{RouteOracle, RouteOracleError, RoutePlanError, RouteResult, ScoredLocation};

/// Default ceiling multiplier for detour travel time.
pub const DEFAULT_ALPHA: f64 = 1.5;

/// Configuration for [`RouteOptimizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    /// Maximum ratio of detour time to direct time.
    pub alpha: f64,
    /// Request detour permutations on separate threads.
    pub parallel: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            parallel: true,
        }
    }
}

impl OptimizerConfig {
    /// Set the ceiling multiplier.
    #[must_use]
    pub const fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Enable or disable concurrent detour requests.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// The route chosen by the optimiser.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimalRoute {
    /// Route returned by the oracle.
    pub route: RouteResult,
    /// Waypoints the route passes through, in order. Empty for the baseline.
    pub via: Vec<ScoredLocation>,
}

impl OptimalRoute {
    /// Whether the chosen route is a detour rather than the direct route.
    #[must_use]
    pub const fn is_detour(&self) -> bool {
        !self.via.is_empty()
    }
}

/// Safety-aware route optimiser over a [`RouteOracle`].
#[derive(Debug)]
pub struct RouteOptimizer<O> {
    oracle: O,
    config: OptimizerConfig,
}

impl<O> RouteOptimizer<O>
where
    O: RouteOracle,
{
    /// Construct an optimiser using default configuration.
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, OptimizerConfig::default())
    }

    /// Construct an optimiser with explicit configuration.
    pub const fn with_config(oracle: O, config: OptimizerConfig) -> Self {
        Self { oracle, config }
    }

    /// Active configuration.
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Borrow the underlying oracle.
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Find the fastest acceptable route from `start` to `end`.
    ///
    /// `candidates` must already be ranked; only the first two are used.
    /// Fewer than two candidates returns the baseline without further
    /// oracle calls. At most five oracle calls are made.
    ///
    /// # Errors
    ///
    /// - [`RoutePlanError::NoBaselineRoute`] when the direct request fails.
    /// - [`RoutePlanError::NoAcceptableDetour`] when the fastest detour
    ///   exceeds `alpha` times the direct travel time.
    pub fn find_optimal_route(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        candidates: &[ScoredLocation],
    ) -> Result<OptimalRoute, RoutePlanError> {
        let baseline = self
            .oracle
            .request_route(start, end, &[])
            .map_err(|source| RoutePlanError::NoBaselineRoute { source })?;
        let shortest_secs = baseline.travel_time_secs();
        log::debug!("baseline route takes {shortest_secs}s");

        let [a, b, ..] = candidates else {
            log::debug!(
                "{} candidate(s) available; keeping the baseline route",
                candidates.len()
            );
            return Ok(OptimalRoute {
                route: baseline,
                via: Vec::new(),
            });
        };

        let permutations = [vec![*a], vec![*b], vec![*a, *b], vec![*b, *a]];
        let outcomes = if self.config.parallel {
            self.request_concurrently(start, end, &permutations)
        } else {
            permutations
                .iter()
                .map(|via| self.request_via(start, end, via))
                .collect()
        };

        let Some(best) = fastest_success(permutations, outcomes) else {
            log::info!("every detour request failed; falling back to the baseline route");
            return Ok(OptimalRoute {
                route: baseline,
                via: Vec::new(),
            });
        };

        let best_secs = best.route.travel_time_secs();
        let ceiling_secs = cost_ceiling(self.config.alpha, shortest_secs);
        if best_secs > ceiling_secs {
            log::info!("fastest detour takes {best_secs}s, above the {ceiling_secs}s ceiling");
            return Err(RoutePlanError::NoAcceptableDetour {
                best_secs,
                ceiling_secs,
            });
        }

        log::info!(
            "selected detour through {} waypoint(s) taking {best_secs}s",
            best.via.len()
        );
        Ok(best)
    }

    fn request_via(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        via: &[ScoredLocation],
    ) -> Result<RouteResult, RouteOracleError> {
        let coords: Vec<Coord<f64>> = via.iter().map(|point| point.location).collect();
        self.oracle.request_route(start, end, &coords)
    }

    fn request_concurrently(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        permutations: &[Vec<ScoredLocation>],
    ) -> Vec<Result<RouteResult, RouteOracleError>> {
        thread::scope(|scope| {
            let handles: Vec<_> = permutations
                .iter()
                .map(|via| scope.spawn(move || self.request_via(start, end, via)))
                .collect();
            // Joined in spawn order so tie-breaking matches the sequential path.
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }
}

/// Find the optimal route with the given `alpha`, requesting detours
/// sequentially.
///
/// Convenience wrapper around [`RouteOptimizer::find_optimal_route`].
///
/// # Errors
///
/// See [`RouteOptimizer::find_optimal_route`].
pub fn find_optimal_route<O>(
    oracle: &O,
    start: Coord<f64>,
    end: Coord<f64>,
    candidates: &[ScoredLocation],
    alpha: f64,
) -> Result<OptimalRoute, RoutePlanError>
where
    O: RouteOracle + ?Sized,
{
    let config = OptimizerConfig::default()
        .with_alpha(alpha)
        .with_parallel(false);
    RouteOptimizer::with_config(oracle, config).find_optimal_route(start, end, candidates)
}

fn fastest_success(
    permutations: [Vec<ScoredLocation>; 4],
    outcomes: Vec<Result<RouteResult, RouteOracleError>>,
) -> Option<OptimalRoute> {
    let mut best: Option<OptimalRoute> = None;
    for (via, outcome) in permutations.into_iter().zip(outcomes) {
        let route = match outcome {
            Ok(route) => route,
            Err(err) => {
                log::warn!("detour through {} waypoint(s) excluded: {err}", via.len());
                continue;
            }
        };
        // Strictly faster only, so earlier permutations win ties.
        let is_better = best
            .as_ref()
            .is_none_or(|current| route.travel_time_secs() < current.route.travel_time_secs());
        if is_better {
            best = Some(OptimalRoute { route, via });
        }
    }
    best
}

#[expect(
    clippy::float_arithmetic,
    reason = "the ceiling is a multiple of the baseline travel time"
)]
fn cost_ceiling(alpha: f64, shortest_secs: f64) -> f64 {
    alpha * shortest_secs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRouteOracle;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    const START: Coord<f64> = Coord { x: 0.0, y: 0.0 };
    const END: Coord<f64> = Coord { x: 10.0, y: 0.0 };

    #[fixture]
    fn candidates() -> Vec<ScoredLocation> {
        vec![
            ScoredLocation::new(Coord { x: 5.0, y: 1.0 }, 5.0).expect("valid a"),
            ScoredLocation::new(Coord { x: 5.0, y: -1.0 }, 3.0).expect("valid b"),
        ]
    }

    fn secs(value: u64) -> RouteResult {
        RouteResult::with_time(Duration::from_secs(value))
    }

    fn scripted(a: Coord<f64>, b: Coord<f64>, times: [Option<u64>; 4]) -> ScriptedRouteOracle {
        let [via_a, via_b, via_ab, via_ba] = times;
        let mut oracle = ScriptedRouteOracle::default().with_route(&[], secs(100));
        for (via, time) in [
            (vec![a], via_a),
            (vec![b], via_b),
            (vec![a, b], via_ab),
            (vec![b, a], via_ba),
        ] {
            if let Some(value) = time {
                oracle = oracle.with_route(&via, secs(value));
            }
        }
        oracle
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn picks_fastest_detour_under_ceiling(
        candidates: Vec<ScoredLocation>,
        #[case] parallel: bool,
    ) {
        let (a, b) = (candidates[0].location, candidates[1].location);
        let oracle = scripted(a, b, [Some(110), Some(95), Some(200), Some(205)]);
        let optimizer =
            RouteOptimizer::with_config(&oracle, OptimizerConfig::default().with_parallel(parallel));

        let chosen = optimizer
            .find_optimal_route(START, END, &candidates)
            .expect("a detour should be accepted");

        assert_eq!(chosen.route.total_time, Some(Duration::from_secs(95)));
        assert_eq!(chosen.via, vec![candidates[1]]);
        assert_eq!(oracle.call_count(), 5);
    }

    #[rstest]
    fn rejects_detour_above_ceiling(candidates: Vec<ScoredLocation>) {
        let (a, b) = (candidates[0].location, candidates[1].location);
        let oracle = scripted(a, b, [None, Some(200), None, None]);

        let err = find_optimal_route(&oracle, START, END, &candidates, DEFAULT_ALPHA)
            .expect_err("200s exceeds the 150s ceiling");

        match err {
            RoutePlanError::NoAcceptableDetour {
                best_secs,
                ceiling_secs,
            } => {
                assert!((best_secs - 200.0).abs() < f64::EPSILON);
                assert!((ceiling_secs - 150.0).abs() < f64::EPSILON);
            }
            other => panic!("expected NoAcceptableDetour, got {other:?}"),
        }
    }

    #[rstest]
    fn detour_exactly_at_ceiling_is_accepted(candidates: Vec<ScoredLocation>) {
        let (a, b) = (candidates[0].location, candidates[1].location);
        let oracle = scripted(a, b, [Some(150), None, None, None]);
        let chosen = find_optimal_route(&oracle, START, END, &candidates, DEFAULT_ALPHA)
            .expect("150s is within the ceiling");
        assert_eq!(chosen.via, vec![candidates[0]]);
    }

    #[rstest]
    fn falls_back_to_baseline_when_all_detours_fail(candidates: Vec<ScoredLocation>) {
        let (a, b) = (candidates[0].location, candidates[1].location);
        let oracle = scripted(a, b, [None, None, None, None]);
        let chosen = find_optimal_route(&oracle, START, END, &candidates, DEFAULT_ALPHA)
            .expect("baseline fallback");
        assert!(!chosen.is_detour());
        assert_eq!(chosen.route.total_time, Some(Duration::from_secs(100)));
        assert_eq!(oracle.call_count(), 5);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn too_few_candidates_returns_baseline_only(
        candidates: Vec<ScoredLocation>,
        #[case] count: usize,
    ) {
        let oracle = ScriptedRouteOracle::default().with_route(&[], secs(100));
        let chosen = find_optimal_route(&oracle, START, END, &candidates[..count], DEFAULT_ALPHA)
            .expect("baseline route");
        assert!(!chosen.is_detour());
        assert_eq!(oracle.call_count(), 1);
    }

    #[rstest]
    fn baseline_failure_skips_detours(candidates: Vec<ScoredLocation>) {
        let oracle = ScriptedRouteOracle::default();
        let err = find_optimal_route(&oracle, START, END, &candidates, DEFAULT_ALPHA)
            .expect_err("baseline is mandatory");
        assert!(matches!(err, RoutePlanError::NoBaselineRoute { .. }));
        assert_eq!(oracle.call_count(), 1);
    }

    #[rstest]
    fn ties_prefer_earlier_permutation(candidates: Vec<ScoredLocation>) {
        let (a, b) = (candidates[0].location, candidates[1].location);
        let oracle = scripted(a, b, [Some(120), Some(120), Some(120), Some(120)]);
        let chosen = find_optimal_route(&oracle, START, END, &candidates, DEFAULT_ALPHA)
            .expect("tie resolves to the first permutation");
        assert_eq!(chosen.via, vec![candidates[0]]);
    }

    #[rstest]
    fn missing_detour_time_never_wins(candidates: Vec<ScoredLocation>) {
        let (a, b) = (candidates[0].location, candidates[1].location);
        let untimed = RouteResult {
            total_time: None,
            path: Vec::new(),
            payload: serde_json::Value::Null,
        };
        let oracle = ScriptedRouteOracle::default()
            .with_route(&[], secs(100))
            .with_route(&[a], untimed)
            .with_route(&[a, b], secs(140));
        let chosen = find_optimal_route(&oracle, START, END, &candidates, DEFAULT_ALPHA)
            .expect("timed detour should win");
        assert_eq!(chosen.via, vec![candidates[0], candidates[1]]);
    }

    #[rstest]
    fn only_first_two_candidates_are_used(candidates: Vec<ScoredLocation>) {
        let (a, b) = (candidates[0].location, candidates[1].location);
        let mut extended = candidates.clone();
        extended.push(ScoredLocation::new(Coord { x: 5.0, y: 0.0 }, 1.0).expect("valid c"));
        let oracle = scripted(a, b, [Some(110), Some(105), None, None]);
        let chosen = find_optimal_route(&oracle, START, END, &extended, DEFAULT_ALPHA)
            .expect("detour accepted");
        assert_eq!(chosen.via, vec![candidates[1]]);
        assert_eq!(oracle.call_count(), 5);
    }
}
