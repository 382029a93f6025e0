//! Scenario configuration.
//!
//! All fields have defaults; a YAML file only needs to override what differs.

use serde::{Deserialize, Serialize};
use td_core::Year;

use crate::schema::DiffusionChoice;
use crate::validate::ValidationError;

/// Top-level scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// First simulated year; base-year shares refer to it.
    pub base_yr: Year,
    /// Last simulated year (inclusive).
    pub end_yr: Year,
    /// Step between simulated years.
    pub sim_yr_interval: u32,
    pub spatial: SpatialConfig,
    pub fit: FitConfig,
    pub capacity: CapacityConfig,
    /// Curve used for technology share diffusion between narrative steps.
    pub tech_diffusion: DiffusionChoice,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            base_yr: 2015,
            end_yr: 2050,
            sim_yr_interval: 1,
            spatial: SpatialConfig::default(),
            fit: FitConfig::default(),
            capacity: CapacityConfig::default(),
            tech_diffusion: DiffusionChoice::Sigmoid,
        }
    }
}

impl ScenarioConfig {
    /// All simulated years in ascending order.
    pub fn simulated_years(&self) -> Vec<Year> {
        let step = self.sim_yr_interval.max(1) as usize;
        (self.base_yr..=self.end_yr).step_by(step).collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end_yr < self.base_yr {
            return Err(ValidationError::InvalidValue {
                field: "end_yr".to_string(),
                value: self.end_yr.to_string(),
                reason: format!("must not precede base_yr {}", self.base_yr),
            });
        }
        if self.sim_yr_interval == 0 {
            return Err(invalid("sim_yr_interval", 0.0, "must be > 0"));
        }
        self.spatial.validate()?;
        self.fit.validate()?;
        if !(self.capacity.full_load_hours > 0.0 && self.capacity.full_load_hours.is_finite()) {
            return Err(invalid(
                "capacity.full_load_hours",
                self.capacity.full_load_hours,
                "must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Spatial diffusion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpatialConfig {
    /// Differentiate diffusion speed between regions.
    pub spatial_explicit_diffusion: bool,
    /// Ratio between the fastest and the slowest regional diffusion speed.
    pub speed_con_max: f64,
    /// Percent of regions flattened at each tail of the indicator distribution.
    pub p_outlier: f64,
    /// Regions with lower indicator values diffuse faster.
    pub low_congruence_crit: bool,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            spatial_explicit_diffusion: false,
            speed_con_max: 1.0,
            p_outlier: 5.0,
            low_congruence_crit: true,
        }
    }
}

impl SpatialConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(self.speed_con_max >= 1.0 && self.speed_con_max.is_finite()) {
            return Err(invalid(
                "spatial.speed_con_max",
                self.speed_con_max,
                "must be finite and >= 1",
            ));
        }
        if !(0.0..50.0).contains(&self.p_outlier) {
            return Err(invalid(
                "spatial.p_outlier",
                self.p_outlier,
                "must be in [0, 50)",
            ));
        }
        Ok(())
    }
}

/// Sigmoid fitting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    /// Upper bound (exclusive) of an admissible midpoint or steepness.
    pub fit_crit_a: f64,
    /// Lower bound (exclusive) of an admissible midpoint or steepness.
    pub fit_crit_b: f64,
    /// Share substituted for a zero share at the first fitting point.
    pub negligible_share: f64,
    /// Year subtracted from calendar years inside the fitted sigmoid.
    pub year_offset: Year,
    pub max_newton_iterations: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            fit_crit_a: 200.0,
            fit_crit_b: 0.001,
            negligible_share: 0.001,
            year_offset: 2000,
            max_newton_iterations: 50,
        }
    }
}

impl FitConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(self.fit_crit_b < self.fit_crit_a) {
            return Err(invalid(
                "fit.fit_crit_b",
                self.fit_crit_b,
                "must be below fit.fit_crit_a",
            ));
        }
        if !(self.negligible_share > 0.0 && self.negligible_share < 0.5) {
            return Err(invalid(
                "fit.negligible_share",
                self.negligible_share,
                "must be in (0, 0.5)",
            ));
        }
        if self.max_newton_iterations == 0 {
            return Err(invalid("fit.max_newton_iterations", 0.0, "must be > 0"));
        }
        Ok(())
    }
}

/// Conversion of installed capacity into service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacityConfig {
    /// Hours per year an installed unit delivers full service.
    pub full_load_hours: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            full_load_hours: 8760.0,
        }
    }
}

fn invalid(field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ScenarioConfig::default();
        config.validate().unwrap();
        let years = config.simulated_years();
        assert_eq!(years.first(), Some(&2015));
        assert_eq!(years.last(), Some(&2050));
        assert_eq!(years.len(), 36);
    }

    #[test]
    fn interval_skips_years() {
        let config = ScenarioConfig {
            base_yr: 2015,
            end_yr: 2025,
            sim_yr_interval: 5,
            ..Default::default()
        };
        assert_eq!(config.simulated_years(), vec![2015, 2020, 2025]);
    }

    #[test]
    fn speed_below_one_is_rejected() {
        let mut config = ScenarioConfig::default();
        config.spatial.speed_con_max = 0.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("speed_con_max"));
    }

    #[test]
    fn inverted_fit_criteria_are_rejected() {
        let mut config = ScenarioConfig::default();
        config.fit.fit_crit_b = 300.0;
        assert!(config.validate().is_err());
    }
}
