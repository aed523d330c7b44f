//! Access to persisted safety weights.
//!
//! [`SafetyStore`] is the read side used by route planning: it returns a
//! full snapshot of scored locations and leaves all filtering to the core.
//! [`HazardReportSink`] is the write side used when a user reports a hazard.
//!
//! The two sides are not synchronised. A planner may read weights while a
//! report is being written; weights are advisory, so a stale read is fine.

use geo::Coord;

use crate::ScoredLocation;

/// Weight added for each hazard report at a location.
pub const DEFAULT_REPORT_INCREMENT: f64 = 0.5;

/// Read-only access to every scored location.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
/// use geo::Coord;
/// use safestep_core::{SafetyStore, ScoredLocation};
///
/// struct FixedStore(Vec<ScoredLocation>);
///
/// impl SafetyStore for FixedStore {
///     type Error = Infallible;
///
///     fn load_scored_locations(&self) -> Result<Vec<ScoredLocation>, Self::Error> {
///         Ok(self.0.clone())
///     }
/// }
///
/// let location = ScoredLocation::new(Coord { x: 0.0, y: 0.0 }, 1.0).unwrap();
/// let store = FixedStore(vec![location]);
/// assert_eq!(store.load_scored_locations().unwrap(), vec![location]);
/// ```
pub trait SafetyStore {
    /// Backend failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return a fresh snapshot of all scored locations.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the snapshot cannot be read.
    fn load_scored_locations(&self) -> Result<Vec<ScoredLocation>, Self::Error>;
}

/// Outcome of a hazard report.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum ReportOutcome {
    /// An existing record at the exact coordinate was incremented.
    Incremented {
        /// Weight after the increment.
        weight: f64,
    },
    /// No record existed, so a new one was created.
    Inserted {
        /// Weight of the new record.
        weight: f64,
    },
}

impl ReportOutcome {
    /// Weight stored after the report.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        match *self {
            Self::Incremented { weight } | Self::Inserted { weight } => weight,
        }
    }
}

/// Record hazard reports against a coordinate.
///
/// Implementations increment the weight of a record at exactly `location`
/// by [`DEFAULT_REPORT_INCREMENT`], or insert a new record with that weight
/// when none exists.
pub trait HazardReportSink {
    /// Backend failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Record one hazard report at `location`.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the report cannot be persisted.
    fn report_hazard(&self, location: Coord<f64>) -> Result<ReportOutcome, Self::Error>;
}
