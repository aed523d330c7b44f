//! Safety-scored locations.
//!
//! A [`ScoredLocation`] pairs a WGS84 coordinate with the advisory safety
//! weight used to rank detour waypoints. Higher weights are preferred.

use geo::Coord;
use thiserror::Error;

/// Errors returned by [`ScoredLocation::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScoredLocationError {
    /// Longitude or latitude was NaN or infinite.
    #[error("coordinate ({x}, {y}) must be finite")]
    NonFiniteCoordinate {
        /// Longitude as supplied.
        x: f64,
        /// Latitude as supplied.
        y: f64,
    },
    /// The weight was negative or not finite.
    #[error("safety weight {weight} must be a finite, non-negative number")]
    InvalidWeight {
        /// Weight as supplied.
        weight: f64,
    },
}

/// A location with an associated safety weight.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use safestep_core::ScoredLocation;
///
/// let location = ScoredLocation::new(Coord { x: 126.97, y: 37.56 }, 3.0)?;
/// assert_eq!(location.weight, 3.0);
/// # Ok::<(), safestep_core::ScoredLocationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredLocation {
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Advisory safety weight; higher means a preferred waypoint.
    pub weight: f64,
}

impl ScoredLocation {
    /// Validate and construct a [`ScoredLocation`].
    ///
    /// # Errors
    ///
    /// Returns [`ScoredLocationError`] when the coordinate is not finite or
    /// the weight is negative or not finite.
    pub fn new(location: Coord<f64>, weight: f64) -> Result<Self, ScoredLocationError> {
        if !location.x.is_finite() || !location.y.is_finite() {
            return Err(ScoredLocationError::NonFiniteCoordinate {
                x: location.x,
                y: location.y,
            });
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(ScoredLocationError::InvalidWeight { weight });
        }
        Ok(Self { location, weight })
    }
}

/// Anything with a WGS84 position that geometric filters can inspect.
pub trait Positioned {
    /// Return the coordinate of `self`.
    fn position(&self) -> Coord<f64>;
}

impl Positioned for Coord<f64> {
    fn position(&self) -> Coord<f64> {
        *self
    }
}

impl Positioned for ScoredLocation {
    fn position(&self) -> Coord<f64> {
        self.location
    }
}
