//! Switch registry and share cascade.
//!
//! - matcher: which switches address a `(region, sector, enduse, year)`
//! - share: per-group technology service shares
//! - cascade: capacity, service and fuel stages producing new share tables

pub mod cascade;
pub mod error;
pub mod matcher;
pub mod share;

pub use cascade::{
    CapacityOutcome, CascadeInput, CascadeSnapshots, SwitchMode, capacity_stage, fuel_stage,
    resolve_cascade, service_stage, theoretical_maximum,
};
pub use error::{CascadeError, CascadeResult};
pub use matcher::{
    MatchedSwitches, SwitchQuery, match_switch_set, match_switches, narrative_timesteps,
};
pub use share::{ShareTable, TechShares, check_group, share_sum};
