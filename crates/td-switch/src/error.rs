//! Error types for switch resolution.

use td_core::{EnduseId, RegionId, SectorId, TechId};
use td_spatial::SpatialError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CascadeError {
    #[error(
        "Configuration conflict: fuel and service switches both defined for enduse '{enduse}' ({})",
        describe_sector(.sector)
    )]
    ConfigurationConflict {
        enduse: EnduseId,
        sector: Option<SectorId>,
    },

    #[error(
        "Share conservation violated in region '{region}', sector '{sector}', enduse '{enduse}': shares sum to {sum}"
    )]
    ShareConservationViolation {
        region: RegionId,
        sector: SectorId,
        enduse: EnduseId,
        sum: f64,
    },

    #[error("Unknown technology: {technology}")]
    UnknownTechnology { technology: TechId },

    #[error("No service demand for enduse '{enduse}' in region '{region}'")]
    MissingServiceDemand { region: RegionId, enduse: EnduseId },

    #[error("Spatial error: {0}")]
    Spatial(#[from] SpatialError),
}

fn describe_sector(sector: &Option<SectorId>) -> String {
    match sector {
        Some(s) => format!("sector '{s}'"),
        None => "all sectors".to_string(),
    }
}

pub type CascadeResult<T> = Result<T, CascadeError>;
