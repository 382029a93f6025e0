//! Spatial diffusion factors.
//!
//! Regional indicator data turn into per-region multipliers used to spread
//! nationally specified scenario values across regions:
//! - `f_reg`: raw diffusion speed per region (1 for the slowest region,
//!   `speed_con_max` for the fastest)
//! - `f_reg_norm`: speed normalized per enduse so the fuel-weighted mean is 1
//! - `f_reg_norm_abs`: fuel-weighted speed normalized to sum to 1 per enduse,
//!   used to allocate absolute quantities such as installed capacity

pub mod error;
pub mod factors;
pub mod outliers;

pub use error::{SpatialError, SpatialResult};
pub use factors::{
    SpatialFactors, calc_diffusion_speeds, calc_spatial_diffusion_factors,
    check_capacity_conservation,
};
pub use outliers::flatten_outliers;
