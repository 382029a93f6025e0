//! Error types for the td-app service layer.

/// Error of a scenario run, wrapping the errors of every stage.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(#[from] td_scenario::ScenarioError),

    #[error("Scenario validation failed: {0}")]
    Validation(#[from] td_scenario::ValidationError),

    #[error("Spatial factors failed: {0}")]
    Spatial(#[from] td_spatial::SpatialError),

    #[error("Switch cascade failed: {0}")]
    Cascade(#[from] td_switch::CascadeError),

    #[error("Curve fitting failed: {0}")]
    Fit(#[from] td_fit::FitError),

    #[error("Annual generation failed: {0}")]
    Annual(td_annual::AnnualError),

    #[error("Failed to read scenario file: {path}")]
    FileRead {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Result type for td-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Fit and cascade failures surface as their own variants.
impl From<td_annual::AnnualError> for AppError {
    fn from(err: td_annual::AnnualError) -> Self {
        match err {
            td_annual::AnnualError::Fit(e) => AppError::Fit(e),
            td_annual::AnnualError::Cascade(e) => AppError::Cascade(e),
            other => AppError::Annual(other),
        }
    }
}
