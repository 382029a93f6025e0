//! Application layer of the technology diffusion engine.
//!
//! Builds the immutable [`ScenarioContext`] and runs every stage in order:
//! spatial factors, narrative regionalisation, switch cascade, curve fitting
//! and annual value generation.

pub mod context;
pub mod error;
pub mod progress;
pub mod run_service;

pub use context::ScenarioContext;
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use run_service::{
    CapacityAllocation, ScenarioOutput, run_scenario, run_scenario_with_progress,
};
