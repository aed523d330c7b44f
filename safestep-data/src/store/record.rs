//! Road-structure records persisted alongside safety weights.

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Survey status of one piece of accessibility infrastructure.
///
/// Stored as an integer code: `0` installed, `1` deficient, `2` missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureStatus {
    /// Present and in working order.
    Installed,
    /// Present but damaged or inadequate.
    Deficient,
    /// Not present.
    Missing,
}

/// Error returned when decoding an unknown status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown infrastructure status code {code}")]
pub struct UnknownStatusCode {
    /// The code that was read.
    pub code: i64,
}

impl InfrastructureStatus {
    /// Integer code used in storage.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Installed => 0,
            Self::Deficient => 1,
            Self::Missing => 2,
        }
    }
}

impl TryFrom<i64> for InfrastructureStatus {
    type Error = UnknownStatusCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Installed),
            1 => Ok(Self::Deficient),
            2 => Ok(Self::Missing),
            _ => Err(UnknownStatusCode { code }),
        }
    }
}

/// One surveyed intersection or hazard location.
///
/// Locations created from hazard reports have no survey, so each status is
/// optional. Only `weight` takes part in route planning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadStructure {
    /// Position (`x` = longitude, `y` = latitude).
    pub location: Coord<f64>,
    /// Tactile paving status.
    pub braille_block: Option<InfrastructureStatus>,
    /// Audible pedestrian signal status.
    pub audio_signal: Option<InfrastructureStatus>,
    /// Bollard status.
    pub bollard: Option<InfrastructureStatus>,
    /// Safety weight; higher ranks first.
    pub weight: f64,
}

impl RoadStructure {
    /// Build an unsurveyed record holding only a weight.
    #[must_use]
    pub const fn unsurveyed(location: Coord<f64>, weight: f64) -> Self {
        Self {
            location,
            braille_block: None,
            audio_signal: None,
            bollard: None,
            weight,
        }
    }
}
