//! Regional diffusion speed factors.

use std::collections::BTreeMap;

use td_core::{EnduseId, RegionId, conserves};
use td_scenario::{RegionalIndicators, SpatialConfig};
use tracing::{debug, info, warn};

use crate::error::{SpatialError, SpatialResult};
use crate::outliers::flatten_outliers;

/// Spatial diffusion factors of one scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialFactors {
    pub f_reg: BTreeMap<RegionId, f64>,
    pub f_reg_norm: BTreeMap<EnduseId, BTreeMap<RegionId, f64>>,
    pub f_reg_norm_abs: BTreeMap<EnduseId, BTreeMap<RegionId, f64>>,
    /// Every region receives identical, non-spatial values.
    pub all_the_same: bool,
}

impl SpatialFactors {
    /// Raw diffusion speed of a region.
    pub fn speed(&self, region: &RegionId) -> f64 {
        self.f_reg.get(region).copied().unwrap_or(1.0)
    }

    /// Multiplier for relative scenario values of `enduse` in `region`.
    ///
    /// Falls back to the raw speed when no enduse weighting exists.
    pub fn relative(&self, enduse: Option<&EnduseId>, region: &RegionId) -> f64 {
        if self.all_the_same {
            return 1.0;
        }
        enduse
            .and_then(|e| self.f_reg_norm.get(e))
            .and_then(|regs| regs.get(region))
            .copied()
            .unwrap_or_else(|| self.speed(region))
    }

    /// Share of an absolute global quantity of `enduse` allocated to `region`.
    pub fn absolute(&self, enduse: &EnduseId, region: &RegionId) -> SpatialResult<f64> {
        let regs = self
            .f_reg_norm_abs
            .get(enduse)
            .ok_or_else(|| SpatialError::UnknownEnduse {
                enduse: enduse.clone(),
            })?;
        regs.get(region)
            .copied()
            .ok_or_else(|| SpatialError::MissingIndicator {
                region: region.clone(),
                what: "absolute diffusion factor",
            })
    }

    /// Split a global value of `enduse` across all regions.
    pub fn allocate(&self, enduse: &EnduseId, global: f64) -> SpatialResult<BTreeMap<RegionId, f64>> {
        let regs = self
            .f_reg_norm_abs
            .get(enduse)
            .ok_or_else(|| SpatialError::UnknownEnduse {
                enduse: enduse.clone(),
            })?;
        let allocated: BTreeMap<RegionId, f64> = regs
            .iter()
            .map(|(region, f)| (region.clone(), global * f))
            .collect();
        check_capacity_conservation(enduse, &allocated, global)?;
        Ok(allocated)
    }
}

/// Compute all spatial factors from regional indicators.
pub fn calc_spatial_diffusion_factors(
    regions: &[RegionId],
    indicators: &RegionalIndicators,
    config: &SpatialConfig,
) -> SpatialResult<SpatialFactors> {
    if regions.is_empty() {
        return Err(SpatialError::NoRegions);
    }

    let all_the_same = !config.spatial_explicit_diffusion;
    let f_reg: BTreeMap<RegionId, f64> = if all_the_same {
        regions.iter().map(|r| (r.clone(), 1.0)).collect()
    } else {
        calc_diffusion_speeds(
            regions,
            &indicators.real_values,
            config.speed_con_max,
            config.p_outlier,
            config.low_congruence_crit,
        )?
    };

    let mut f_reg_norm = BTreeMap::new();
    let mut f_reg_norm_abs = BTreeMap::new();

    for (enduse, fuel_regs) in &indicators.enduse_fuel {
        let fuel_shares = regional_fuel_shares(enduse, regions, fuel_regs)?;

        let weighted: BTreeMap<&RegionId, f64> = fuel_shares
            .iter()
            .map(|(region, share)| (*region, share * f_reg[*region]))
            .collect();
        let weighted_sum: f64 = weighted.values().sum();

        let norm = regions
            .iter()
            .map(|r| (r.clone(), f_reg[r] / weighted_sum))
            .collect();
        let norm_abs = weighted
            .iter()
            .map(|(region, w)| ((*region).clone(), w / weighted_sum))
            .collect();

        f_reg_norm.insert(enduse.clone(), norm);
        f_reg_norm_abs.insert(enduse.clone(), norm_abs);
    }

    info!(
        regions = regions.len(),
        enduses = indicators.enduse_fuel.len(),
        all_the_same,
        "spatial diffusion factors computed"
    );

    Ok(SpatialFactors {
        f_reg,
        f_reg_norm,
        f_reg_norm_abs,
        all_the_same,
    })
}

/// Raw diffusion speed per region.
///
/// Indicator values are outlier-flattened, then mapped linearly onto
/// `[1, speed_con_max]`. With `low_congruence_crit` the lowest indicator
/// diffuses fastest.
pub fn calc_diffusion_speeds(
    regions: &[RegionId],
    real_values: &BTreeMap<RegionId, f64>,
    speed_con_max: f64,
    p_outlier: f64,
    low_congruence_crit: bool,
) -> SpatialResult<BTreeMap<RegionId, f64>> {
    let mut raw = Vec::with_capacity(regions.len());
    for region in regions {
        let value = *real_values
            .get(region)
            .ok_or_else(|| SpatialError::MissingIndicator {
                region: region.clone(),
                what: "diffusion indicator",
            })?;
        if !value.is_finite() {
            return Err(SpatialError::InvalidIndicator {
                region: region.clone(),
                what: "diffusion indicator",
                value,
            });
        }
        raw.push(value);
    }

    let flat = flatten_outliers(&raw, p_outlier);
    let min = flat.iter().copied().fold(f64::INFINITY, f64::min);
    let max = flat.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    debug!(min, max, p_outlier, "diffusion indicator range after flattening");

    let range = max - min;
    let speeds = regions
        .iter()
        .zip(flat)
        .map(|(region, value)| {
            let speed = if range <= f64::EPSILON * max.abs().max(1.0) {
                1.0
            } else {
                let mut t = (value - min) / range;
                if low_congruence_crit {
                    t = 1.0 - t;
                }
                1.0 + t * (speed_con_max - 1.0)
            };
            (region.clone(), speed)
        })
        .collect();
    Ok(speeds)
}

fn regional_fuel_shares<'a>(
    enduse: &EnduseId,
    regions: &'a [RegionId],
    fuel_regs: &BTreeMap<RegionId, f64>,
) -> SpatialResult<BTreeMap<&'a RegionId, f64>> {
    let mut fuels = BTreeMap::new();
    for region in regions {
        let fuel = *fuel_regs
            .get(region)
            .ok_or_else(|| SpatialError::MissingIndicator {
                region: region.clone(),
                what: "enduse fuel",
            })?;
        if !(fuel >= 0.0 && fuel.is_finite()) {
            return Err(SpatialError::InvalidIndicator {
                region: region.clone(),
                what: "enduse fuel",
                value: fuel,
            });
        }
        fuels.insert(region, fuel);
    }

    let total: f64 = fuels.values().sum();
    if total <= 0.0 {
        warn!(enduse = %enduse, "no regional fuel for enduse, weighting regions equally");
        let equal = 1.0 / regions.len() as f64;
        return Ok(fuels.into_keys().map(|r| (r, equal)).collect());
    }
    Ok(fuels.into_iter().map(|(r, fuel)| (r, fuel / total)).collect())
}

/// Regional allocations of `enduse` must add up to the global value.
pub fn check_capacity_conservation(
    enduse: &EnduseId,
    allocated: &BTreeMap<RegionId, f64>,
    global: f64,
) -> SpatialResult<()> {
    let total: f64 = allocated.values().sum();
    if !conserves(total, global) {
        return Err(SpatialError::CapacityConservationViolation {
            enduse: enduse.clone(),
            total,
            expected: global,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_core::{Tolerances, nearly_equal};

    fn regions(names: &[&str]) -> Vec<RegionId> {
        names.iter().map(|n| RegionId::from(*n)).collect()
    }

    fn indicators(fuel: &[(&str, f64)], real: &[(&str, f64)]) -> RegionalIndicators {
        RegionalIndicators {
            real_values: real.iter().map(|(r, v)| (RegionId::from(*r), *v)).collect(),
            enduse_fuel: BTreeMap::from([(
                EnduseId::from("space_heating"),
                fuel.iter().map(|(r, v)| (RegionId::from(*r), *v)).collect(),
            )]),
        }
    }

    #[test]
    fn absolute_factors_follow_regional_fuel() {
        let regions = regions(&["r1", "r2"]);
        let ind = indicators(&[("r1", 10.0), ("r2", 30.0)], &[]);
        let factors =
            calc_spatial_diffusion_factors(&regions, &ind, &SpatialConfig::default()).unwrap();

        let enduse = EnduseId::from("space_heating");
        let allocated = factors.allocate(&enduse, 8.0).unwrap();
        let tol = Tolerances::absolute(1e-12);
        assert!(nearly_equal(allocated[&regions[0]], 2.0, tol));
        assert!(nearly_equal(allocated[&regions[1]], 6.0, tol));
        assert!(factors.all_the_same);
        assert_eq!(factors.relative(Some(&enduse), &regions[0]), 1.0);
    }

    #[test]
    fn disabled_spatial_diffusion_gives_unit_speed() {
        let regions = regions(&["r1", "r2", "r3"]);
        let ind = indicators(
            &[("r1", 1.0), ("r2", 1.0), ("r3", 1.0)],
            &[("r1", 1.0), ("r2", 50.0), ("r3", 900.0)],
        );
        let factors =
            calc_spatial_diffusion_factors(&regions, &ind, &SpatialConfig::default()).unwrap();
        assert!(factors.f_reg.values().all(|f| *f == 1.0));
    }

    #[test]
    fn speeds_span_configured_range() {
        let regions = regions(&["dense", "mid", "sparse"]);
        let real = BTreeMap::from([
            (RegionId::from("dense"), 100.0),
            (RegionId::from("mid"), 50.0),
            (RegionId::from("sparse"), 0.0),
        ]);
        let speeds = calc_diffusion_speeds(&regions, &real, 3.0, 0.0, true).unwrap();
        assert_eq!(speeds[&RegionId::from("sparse")], 3.0);
        assert_eq!(speeds[&RegionId::from("mid")], 2.0);
        assert_eq!(speeds[&RegionId::from("dense")], 1.0);

        let inverse = calc_diffusion_speeds(&regions, &real, 3.0, 0.0, false).unwrap();
        assert_eq!(inverse[&RegionId::from("dense")], 3.0);
    }

    #[test]
    fn relative_factors_keep_fuel_weighted_mean() {
        let regions = regions(&["r1", "r2"]);
        let ind = indicators(&[("r1", 10.0), ("r2", 30.0)], &[("r1", 0.0), ("r2", 1.0)]);
        let config = SpatialConfig {
            spatial_explicit_diffusion: true,
            speed_con_max: 2.0,
            p_outlier: 0.0,
            low_congruence_crit: true,
        };
        let factors = calc_spatial_diffusion_factors(&regions, &ind, &config).unwrap();
        let enduse = EnduseId::from("space_heating");

        let mean = 0.25 * factors.relative(Some(&enduse), &regions[0])
            + 0.75 * factors.relative(Some(&enduse), &regions[1]);
        assert!(nearly_equal(mean, 1.0, Tolerances::default()));
        assert!(
            factors.relative(Some(&enduse), &regions[0])
                > factors.relative(Some(&enduse), &regions[1])
        );
    }

    #[test]
    fn missing_indicator_is_reported() {
        let regions = regions(&["r1", "r2"]);
        let ind = indicators(&[("r1", 10.0)], &[]);
        let err =
            calc_spatial_diffusion_factors(&regions, &ind, &SpatialConfig::default()).unwrap_err();
        assert!(matches!(err, SpatialError::MissingIndicator { .. }));
    }

    #[test]
    fn conservation_check_detects_leak() {
        let enduse = EnduseId::from("space_heating");
        let allocated = BTreeMap::from([(RegionId::from("r1"), 1.0), (RegionId::from("r2"), 1.5)]);
        assert!(check_capacity_conservation(&enduse, &allocated, 2.5).is_ok());
        assert!(matches!(
            check_capacity_conservation(&enduse, &allocated, 3.0),
            Err(SpatialError::CapacityConservationViolation { .. })
        ));
    }
}
