//! Annual parameter generation.
//!
//! Narrative segments of strategy variables and the diffusion steps of
//! technology shares are expanded into one value per simulated year.

pub mod error;
pub mod narrative;
pub mod tech_shares;

pub use error::{AnnualError, AnnualResult};
pub use narrative::{
    GeneratedVariable, RegionalNarratives, VariableSeries, expand_segments,
    generate_annual_param_vals, regionalise_narratives, segment_value,
};
pub use tech_shares::{
    AnnualTechShares, DiffusionStep, GroupDiffusion, InstalledCurve, TechCurve, curve_params,
    generate_annual_tech_shares, plan_tech_diffusion,
};
