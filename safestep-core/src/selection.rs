//! Rank scored locations and keep the safest few as detour waypoints.

use std::cmp::Ordering;

use crate::{Circle, ScoredLocation, points_within_circle};

/// Upper bound on waypoints the optimiser will thread a route through.
pub const MAX_DETOUR_WAYPOINTS: usize = 2;

/// Return the `k` highest-weighted points, best first.
///
/// The sort is stable: points with equal weight keep their input order.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use safestep_core::{ScoredLocation, select_top_safety};
///
/// let points = [
///     ScoredLocation::new(Coord { x: 0.0, y: 0.0 }, 1.0)?,
///     ScoredLocation::new(Coord { x: 1.0, y: 0.0 }, 5.0)?,
///     ScoredLocation::new(Coord { x: 2.0, y: 0.0 }, 3.0)?,
/// ];
/// let top = select_top_safety(&points, 2);
/// assert_eq!(top.iter().map(|p| p.weight).collect::<Vec<_>>(), vec![5.0, 3.0]);
/// # Ok::<(), safestep_core::ScoredLocationError>(())
/// ```
#[must_use]
pub fn select_top_safety(points: &[ScoredLocation], k: usize) -> Vec<ScoredLocation> {
    let mut ranked = points.to_vec();
    // `sort_by` is stable; ties stay in input order.
    ranked.sort_by(|lhs, rhs| descending_weight(lhs.weight, rhs.weight));
    ranked.truncate(k);
    ranked
}

/// Total order on weights, highest first, with NaN ranked after every number.
fn descending_weight(lhs: f64, rhs: f64) -> Ordering {
    match (lhs.is_nan(), rhs.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => rhs.partial_cmp(&lhs).unwrap_or(Ordering::Equal),
    }
}

/// Filters a snapshot to a search circle and keeps the safest points.
///
/// The limit is clamped to [`MAX_DETOUR_WAYPOINTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSelector {
    limit: usize,
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new(MAX_DETOUR_WAYPOINTS)
    }
}

impl CandidateSelector {
    /// Create a selector returning at most `limit` points.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        let clamped = if limit > MAX_DETOUR_WAYPOINTS {
            MAX_DETOUR_WAYPOINTS
        } else {
            limit
        };
        Self { limit: clamped }
    }

    /// Effective number of points returned by [`Self::select`].
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Keep points inside `circle`, then return the safest of them.
    #[must_use]
    pub fn select(&self, points: &[ScoredLocation], circle: &Circle) -> Vec<ScoredLocation> {
        let inside = points_within_circle(points, circle.center, circle.radius);
        log::debug!(
            "{} of {} scored locations fall inside the search circle",
            inside.len(),
            points.len()
        );
        select_top_safety(&inside, self.limit)
    }
}
