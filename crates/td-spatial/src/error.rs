//! Error types for spatial factor computation.

use td_core::{EnduseId, RegionId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    #[error("No regions defined")]
    NoRegions,

    #[error("Missing {what} for region '{region}'")]
    MissingIndicator { region: RegionId, what: &'static str },

    #[error("Invalid {what} for region '{region}': {value}")]
    InvalidIndicator {
        region: RegionId,
        what: &'static str,
        value: f64,
    },

    #[error("No regional fuel defined for enduse '{enduse}'")]
    UnknownEnduse { enduse: EnduseId },

    #[error(
        "Capacity conservation violated for enduse '{enduse}': regions sum to {total}, expected {expected}"
    )]
    CapacityConservationViolation {
        enduse: EnduseId,
        total: f64,
        expected: f64,
    },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
