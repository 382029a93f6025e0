//! Stage events of a scenario run.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    ComputingSpatialFactors,
    RegionalisingNarratives,
    ResolvingCascade,
    FittingCurves,
    GeneratingAnnualValues,
    Completed,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
