//! Error types for curve fitting.

use td_core::{EnduseId, RegionId, SectorId, TechId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Invalid fit input: {what}")]
    InvalidInput { what: String },

    #[error(
        "No admissible sigmoid fit for technology '{technology}' (region '{region}', sector '{sector}', enduse '{enduse}') after {attempts} attempts"
    )]
    NonConvergence {
        region: RegionId,
        sector: SectorId,
        enduse: EnduseId,
        technology: TechId,
        attempts: usize,
    },
}

pub type FitResult<T> = Result<T, FitError>;
