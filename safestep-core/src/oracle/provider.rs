//! Route oracle trait and the route payload it returns.

use std::time::Duration;

use geo::Coord;

use super::error::RouteOracleError;

/// A route returned by a [`RouteOracle`].
///
/// Only `total_time` is interpreted by the optimiser. `path` and `payload`
/// are carried through to the caller untouched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResult {
    /// Total walking time, or `None` when the service omitted it.
    pub total_time: Option<Duration>,
    /// Route geometry as an ordered polyline.
    pub path: Vec<Coord<f64>>,
    /// Raw service response.
    pub payload: serde_json::Value,
}

impl RouteResult {
    /// Construct a route with a known travel time and no geometry.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use safestep_core::RouteResult;
    ///
    /// let route = RouteResult::with_time(Duration::from_secs(95));
    /// assert_eq!(route.travel_time_secs(), 95.0);
    /// ```
    #[must_use]
    pub const fn with_time(total_time: Duration) -> Self {
        Self {
            total_time: Some(total_time),
            path: Vec::new(),
            payload: serde_json::Value::Null,
        }
    }

    /// Travel time in seconds; `f64::INFINITY` when the service omitted it.
    ///
    /// A route with unknown time is never preferred over one with a known
    /// time, but it is not an error either.
    #[must_use]
    pub fn travel_time_secs(&self) -> f64 {
        self.total_time
            .map_or(f64::INFINITY, |time| time.as_secs_f64())
    }
}

/// Fetch a walking route through an ordered list of via points.
///
/// `via` holds zero, one or two coordinates inserted between `start` and
/// `end` in the given order. Implementations must not reorder them.
/// Oracles must be `Send + Sync` so detour permutations can be requested
/// concurrently.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use geo::Coord;
/// use safestep_core::{RouteOracle, RouteOracleError, RouteResult};
///
/// struct CountingOracle;
///
/// impl RouteOracle for CountingOracle {
///     fn request_route(
///         &self,
///         _start: Coord<f64>,
///         _end: Coord<f64>,
///         via: &[Coord<f64>],
///     ) -> Result<RouteResult, RouteOracleError> {
///         let secs = 60 * (1 + via.len() as u64);
///         Ok(RouteResult::with_time(Duration::from_secs(secs)))
///     }
/// }
///
/// let route = CountingOracle.request_route(
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 1.0, y: 1.0 },
///     &[],
/// )?;
/// assert_eq!(route.total_time, Some(Duration::from_secs(60)));
/// # Ok::<(), RouteOracleError>(())
/// ```
pub trait RouteOracle: Send + Sync {
    /// Request a single route from `start` to `end` via `via`.
    fn request_route(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        via: &[Coord<f64>],
    ) -> Result<RouteResult, RouteOracleError>;
}

impl<T> RouteOracle for &T
where
    T: RouteOracle + ?Sized,
{
    fn request_route(
        &self,
        start: Coord<f64>,
        end: Coord<f64>,
        via: &[Coord<f64>],
    ) -> Result<RouteResult, RouteOracleError> {
        (**self).request_route(start, end, via)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn missing_time_is_infinite() {
        let route = RouteResult {
            total_time: None,
            path: Vec::new(),
            payload: serde_json::Value::Null,
        };
        assert!(route.travel_time_secs().is_infinite());
    }

    #[rstest]
    fn known_time_is_reported_in_seconds() {
        let route = RouteResult::with_time(Duration::from_millis(1_500));
        assert!((route.travel_time_secs() - 1.5).abs() < f64::EPSILON);
    }
}
