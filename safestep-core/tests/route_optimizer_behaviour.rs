//! Behavioural tests for `RouteOptimizer` using a scripted routing oracle.

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use safestep_core::test_support::ScriptedRouteOracle;
use safestep_core::{
    OptimalRoute, OptimizerConfig, RouteOptimizer, RouteResult, RoutePlanError, ScoredLocation,
};
use std::cell::RefCell;
use std::time::Duration;

type OracleCell = RefCell<Option<ScriptedRouteOracle>>;
type CandidateCell = RefCell<Vec<ScoredLocation>>;
type OutcomeCell = RefCell<Option<Result<OptimalRoute, RoutePlanError>>>;

const START: Coord<f64> = Coord { x: 0.0, y: 0.0 };
const END: Coord<f64> = Coord { x: 10.0, y: 0.0 };
const A: ScoredLocation = ScoredLocation {
    location: Coord { x: 5.0, y: 1.0 },
    weight: 5.0,
};
const B: ScoredLocation = ScoredLocation {
    location: Coord { x: 5.0, y: -1.0 },
    weight: 3.0,
};

#[fixture]
fn oracle() -> OracleCell {
    RefCell::new(None)
}

#[fixture]
fn candidates() -> CandidateCell {
    RefCell::new(Vec::new())
}

#[fixture]
fn outcome() -> OutcomeCell {
    RefCell::new(None)
}

fn route(secs: u64) -> RouteResult {
    RouteResult::with_time(Duration::from_secs(secs))
}

fn add_route(oracle: &OracleCell, via: &[Coord<f64>], secs: u64) {
    let current = oracle.borrow_mut().take().unwrap_or_default();
    *oracle.borrow_mut() = Some(current.with_route(via, route(secs)));
}

// --- Given steps ---

#[given("two ranked candidates beside a 100 second direct route")]
fn two_candidates(
    #[from(oracle)] oracle: &OracleCell,
    #[from(candidates)] candidates: &CandidateCell,
) {
    *candidates.borrow_mut() = vec![A, B];
    add_route(oracle, &[], 100);
}

#[given("no candidates beside a 100 second direct route")]
fn no_candidates(#[from(oracle)] oracle: &OracleCell) {
    add_route(oracle, &[], 100);
}

#[given("two ranked candidates and an unavailable direct route")]
fn unavailable_direct_route(
    #[from(oracle)] oracle: &OracleCell,
    #[from(candidates)] candidates: &CandidateCell,
) {
    *candidates.borrow_mut() = vec![A, B];
    *oracle.borrow_mut() = Some(ScriptedRouteOracle::default());
}

#[given("detour times of 110, 95, 200 and 205 seconds")]
fn all_detours(#[from(oracle)] oracle: &OracleCell) {
    add_route(oracle, &[A.location], 110);
    add_route(oracle, &[B.location], 95);
    add_route(oracle, &[A.location, B.location], 200);
    add_route(oracle, &[B.location, A.location], 205);
}

#[given("only the second candidate detour succeeds at 200 seconds")]
fn only_second_detour(#[from(oracle)] oracle: &OracleCell) {
    add_route(oracle, &[B.location], 200);
}

// --- When steps ---

#[when("I request the optimal route with alpha 1.5")]
fn request_optimal_route(
    #[from(oracle)] oracle: &OracleCell,
    #[from(candidates)] candidates: &CandidateCell,
    #[from(outcome)] outcome: &OutcomeCell,
) {
    let guard = oracle.borrow();
    let scripted = guard.as_ref().expect("oracle must be initialised");
    let optimizer = RouteOptimizer::with_config(scripted, OptimizerConfig::default().with_alpha(1.5));
    *outcome.borrow_mut() = Some(optimizer.find_optimal_route(START, END, &candidates.borrow()));
}

// --- Then steps ---

#[then("the detour through the second candidate is returned")]
fn then_second_detour(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let chosen = borrowed
        .as_ref()
        .expect("optimiser should have run")
        .as_ref()
        .expect("expected an accepted route");
    assert_eq!(chosen.via, vec![B]);
    assert_eq!(chosen.route.total_time, Some(Duration::from_secs(95)));
}

#[then("the direct route is returned")]
fn then_direct_route(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let chosen = borrowed
        .as_ref()
        .expect("optimiser should have run")
        .as_ref()
        .expect("expected the direct route");
    assert!(!chosen.is_detour(), "expected no waypoints");
    assert_eq!(chosen.route.total_time, Some(Duration::from_secs(100)));
}

#[then("no acceptable route is reported")]
fn then_no_acceptable_route(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    assert!(
        matches!(
            borrowed.as_ref(),
            Some(Err(RoutePlanError::NoAcceptableDetour { .. }))
        ),
        "expected NoAcceptableDetour, got {borrowed:?}"
    );
}

#[then("no baseline route is reported")]
fn then_no_baseline_route(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    assert!(
        matches!(
            borrowed.as_ref(),
            Some(Err(RoutePlanError::NoBaselineRoute { .. }))
        ),
        "expected NoBaselineRoute, got {borrowed:?}"
    );
}

#[then("five routing requests were made")]
fn then_five_requests(#[from(oracle)] oracle: &OracleCell) {
    let guard = oracle.borrow();
    let scripted = guard.as_ref().expect("oracle must be initialised");
    assert_eq!(scripted.call_count(), 5);
}

#[then("one routing request was made")]
fn then_one_request(#[from(oracle)] oracle: &OracleCell) {
    let guard = oracle.borrow();
    let scripted = guard.as_ref().expect("oracle must be initialised");
    assert_eq!(scripted.call_count(), 1);
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $index:literal) => {
        #[scenario(path = "tests/features/route_optimizer.feature", index = $index)]
        fn $fn_name(oracle: OracleCell, candidates: CandidateCell, outcome: OutcomeCell) {
            let _ = (oracle, candidates, outcome);
        }
    };
}

register_scenario!(fastest_detour_within_ceiling, 0);
register_scenario!(detour_above_ceiling, 1);
register_scenario!(no_candidates_keeps_direct_route, 2);
register_scenario!(direct_route_unavailable, 3);
