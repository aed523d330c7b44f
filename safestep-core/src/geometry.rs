//! Planar geometry used to bound the detour search area.
//!
//! Distances are Euclidean in raw longitude/latitude degrees. The search
//! area only has to be roughly proportional to the trip, so no geodesic
//! correction is applied.

use geo::{Coord, Distance, Euclidean, Point};

use crate::Positioned;

/// Default scale applied to the start/end distance when sizing the circle.
pub const DEFAULT_CIRCLE_FACTOR: f64 = 1.1;

/// A circle in longitude/latitude space.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use safestep_core::Circle;
///
/// let circle = Circle::enclosing(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 }, 1.0);
/// assert_eq!(circle.center, Coord { x: 5.0, y: 0.0 });
/// assert!(circle.contains(Coord { x: 5.0, y: 1.0 }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    /// Centre of the circle.
    pub center: Coord<f64>,
    /// Radius in degrees.
    pub radius: f64,
}

impl Circle {
    /// Build the search circle for a trip from `start` to `end`.
    ///
    /// See [`midpoint_and_circle`].
    #[must_use]
    pub fn enclosing(start: Coord<f64>, end: Coord<f64>, factor: f64) -> Self {
        let (center, radius) = midpoint_and_circle(start, end, factor);
        Self { center, radius }
    }

    /// Whether `point` lies inside the circle. The boundary counts as inside.
    #[must_use]
    pub fn contains(&self, point: Coord<f64>) -> bool {
        planar_distance(self.center, point) <= self.radius
    }
}

/// Return the midpoint of `start` and `end` and the search radius.
///
/// The radius is the straight-line distance between the two points scaled by
/// `factor`. Callers must pass finite coordinates and a non-negative factor;
/// NaN and infinities propagate into the result unchanged.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use safestep_core::midpoint_and_circle;
///
/// let (mid, radius) = midpoint_and_circle(Coord { x: 0.0, y: 0.0 }, Coord { x: 3.0, y: 4.0 }, 2.0);
/// assert_eq!(mid, Coord { x: 1.5, y: 2.0 });
/// assert_eq!(radius, 10.0);
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "midpoint and radius are plain coordinate arithmetic"
)]
#[must_use]
pub fn midpoint_and_circle(start: Coord<f64>, end: Coord<f64>, factor: f64) -> (Coord<f64>, f64) {
    let midpoint = Coord {
        x: (start.x + end.x) / 2.0,
        y: (start.y + end.y) / 2.0,
    };
    let radius = planar_distance(start, end) * factor;
    (midpoint, radius)
}

/// Return every point within `radius` of `center`, preserving input order.
///
/// Points exactly on the boundary are kept, so a zero radius still returns
/// points that coincide with `center`.
#[must_use]
pub fn points_within_circle<T>(points: &[T], center: Coord<f64>, radius: f64) -> Vec<T>
where
    T: Positioned + Clone,
{
    let circle = Circle { center, radius };
    points
        .iter()
        .filter(|point| circle.contains(point.position()))
        .cloned()
        .collect()
}

pub(crate) fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Euclidean.distance(Point::from(a), Point::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScoredLocation;
    use rstest::rstest;

    fn scored(x: f64, y: f64, weight: f64) -> ScoredLocation {
        ScoredLocation::new(Coord { x, y }, weight).expect("valid location")
    }

    #[rstest]
    fn default_factor_widens_radius() {
        let (mid, radius) = midpoint_and_circle(
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 10.0, y: 0.0 },
            DEFAULT_CIRCLE_FACTOR,
        );
        assert_eq!(mid, Coord { x: 5.0, y: 0.0 });
        assert!((radius - 11.0).abs() < 1e-9);
    }

    #[rstest]
    fn identical_endpoints_give_zero_radius() {
        let here = Coord { x: 127.0, y: 37.5 };
        let (mid, radius) = midpoint_and_circle(here, here, DEFAULT_CIRCLE_FACTOR);
        assert_eq!(mid, here);
        assert_eq!(radius, 0.0);

        let points = vec![here, Coord { x: 127.0, y: 37.500_001 }];
        assert_eq!(points_within_circle(&points, mid, radius), vec![here]);
    }

    #[rstest]
    #[case(Coord { x: 1.0, y: 0.0 }, true)] // boundary
    #[case(Coord { x: 0.0, y: -1.0 }, true)] // boundary
    #[case(Coord { x: 0.5, y: 0.5 }, true)]
    #[case(Coord { x: 1.000_000_1, y: 0.0 }, false)]
    #[case(Coord { x: 0.8, y: 0.8 }, false)]
    fn contains_is_boundary_inclusive(#[case] point: Coord<f64>, #[case] inside: bool) {
        let circle = Circle {
            center: Coord { x: 0.0, y: 0.0 },
            radius: 1.0,
        };
        assert_eq!(circle.contains(point), inside);
    }

    #[rstest]
    fn filtering_preserves_order() {
        let points = vec![
            scored(2.0, 0.0, 1.0),
            scored(50.0, 0.0, 9.0),
            scored(-1.0, 0.0, 4.0),
            scored(0.0, 2.5, 2.0),
        ];
        let found = points_within_circle(&points, Coord { x: 0.0, y: 0.0 }, 3.0);
        let weights: Vec<f64> = found.iter().map(|p| p.weight).collect();
        assert_eq!(weights, vec![1.0, 4.0, 2.0]);
    }

    #[rstest]
    fn nan_radius_excludes_everything() {
        let points = vec![Coord { x: 0.0, y: 0.0 }];
        assert!(points_within_circle(&points, Coord { x: 0.0, y: 0.0 }, f64::NAN).is_empty());
    }
}
