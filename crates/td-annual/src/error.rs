//! Error types for annual value generation.

use td_core::Year;
use td_fit::FitError;
use td_scenario::ValidationError;
use td_switch::CascadeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnualError {
    #[error("Fit error: {0}")]
    Fit(#[from] FitError),

    #[error("Cascade error: {0}")]
    Cascade(#[from] CascadeError),

    #[error("Invalid narrative: {0}")]
    Narrative(#[from] ValidationError),

    #[error("No cascade result for step year {year}")]
    MissingStep { year: Year },
}

pub type AnnualResult<T> = Result<T, AnnualError>;
