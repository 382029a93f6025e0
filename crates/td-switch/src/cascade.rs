//! Capacity, service and fuel switch stages.
//!
//! Each stage maps a [`ShareTable`] to a new one; the input is never
//! modified. Stages run in the order capacity, service, fuel, and every
//! output table keeps the technology shares of each group summing to one.

use std::collections::BTreeMap;

use td_core::{ShareKey, TechId, Year};
use td_scenario::{
    FuelSwitch, RegionalIndicators, ScenarioConfig, ServiceSwitch, SwitchScope, SwitchSet,
    Technology, find_switch_conflict,
};
use td_spatial::SpatialFactors;
use tracing::{debug, info, trace};

use crate::error::{CascadeError, CascadeResult};
use crate::matcher::{SwitchQuery, match_switches};
use crate::share::{ShareTable, TechShares, share_sum};

/// Which fraction of a fuel switch to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchMode {
    /// `share_fuel_consumption_switched`
    Actual,
    /// `max_theoretical_switch`, used for the sigmoid ceiling.
    MaxTheoretical,
}

/// Immutable inputs shared by all stages.
#[derive(Debug, Clone)]
pub struct CascadeInput<'a> {
    switches: &'a SwitchSet,
    technologies: BTreeMap<TechId, &'a Technology>,
    spatial: &'a SpatialFactors,
    indicators: &'a RegionalIndicators,
    config: &'a ScenarioConfig,
}

impl<'a> CascadeInput<'a> {
    /// Fails with [`CascadeError::ConfigurationConflict`] when a fuel and a
    /// service switch address the same `(enduse, sector)`.
    pub fn new(
        switches: &'a SwitchSet,
        technologies: &'a [Technology],
        spatial: &'a SpatialFactors,
        indicators: &'a RegionalIndicators,
        config: &'a ScenarioConfig,
    ) -> CascadeResult<Self> {
        if let Some((enduse, sector)) = find_switch_conflict(switches) {
            return Err(CascadeError::ConfigurationConflict { enduse, sector });
        }

        let input = Self {
            switches,
            technologies: technologies.iter().map(|t| (t.name.clone(), t)).collect(),
            spatial,
            indicators,
            config,
        };

        let installed = switches
            .fuel
            .iter()
            .map(|s| &s.technology_install)
            .chain(switches.service.iter().map(|s| &s.technology))
            .chain(switches.capacity.iter().map(|s| &s.technology_install));
        for technology in installed {
            input.technology(technology)?;
        }
        Ok(input)
    }

    pub fn switches(&self) -> &SwitchSet {
        self.switches
    }

    pub fn spatial(&self) -> &SpatialFactors {
        self.spatial
    }

    pub fn technology(&self, technology: &TechId) -> CascadeResult<&'a Technology> {
        self.technologies
            .get(technology)
            .copied()
            .ok_or_else(|| CascadeError::UnknownTechnology {
                technology: technology.clone(),
            })
    }

    fn query<'k>(&self, key: &'k ShareKey, year: Year) -> SwitchQuery<'k> {
        SwitchQuery::new(&key.enduse, &key.sector)
            .in_region(&key.region)
            .in_year(year)
    }
}

/// Capacity stage output.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityOutcome {
    pub table: ShareTable,
    /// Regional service targets equivalent to the applied capacity.
    pub derived: Vec<ServiceSwitch>,
}

/// Named tables after each stage of one step year.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeSnapshots {
    pub year: Year,
    pub after_capacity: ShareTable,
    pub after_service: ShareTable,
    pub after_fuel: ShareTable,
    pub derived_service_switches: Vec<ServiceSwitch>,
}

/// Run all three stages for the switches of `year` on `base`.
pub fn resolve_cascade(
    input: &CascadeInput<'_>,
    base: &ShareTable,
    year: Year,
) -> CascadeResult<CascadeSnapshots> {
    info!(year, groups = base.len(), "resolving switch cascade");

    let capacity = capacity_stage(input, base, year)?;
    capacity.table.check_conservation()?;

    let after_service = service_stage(input, &capacity.table, &capacity.derived, year)?;
    after_service.check_conservation()?;

    let after_fuel = fuel_stage(input, &after_service, year, SwitchMode::Actual)?;
    after_fuel.check_conservation()?;

    Ok(CascadeSnapshots {
        year,
        after_capacity: capacity.table,
        after_service,
        after_fuel,
        derived_service_switches: capacity.derived,
    })
}

/// Fold regional installed capacity into service shares.
pub fn capacity_stage(
    input: &CascadeInput<'_>,
    table: &ShareTable,
    year: Year,
) -> CascadeResult<CapacityOutcome> {
    let mut out = ShareTable::default();
    let mut derived = Vec::new();

    for (key, shares) in table.iter() {
        let matched = match_switches(&input.switches.capacity, &input.query(key, year));
        if matched.is_empty() {
            out.insert(key.clone(), shares.clone());
            continue;
        }

        let demand = input
            .indicators
            .enduse_fuel
            .get(&key.enduse)
            .and_then(|regions| regions.get(&key.region))
            .copied()
            .filter(|d| *d > 0.0 && d.is_finite())
            .ok_or_else(|| CascadeError::MissingServiceDemand {
                region: key.region.clone(),
                enduse: key.enduse.clone(),
            })?;

        let mut current = shares.clone();
        let mut installed = Vec::new();
        for switch in matched {
            let capacity = match switch.region {
                Some(_) => switch.installed_capacity,
                None => {
                    input.spatial.absolute(&key.enduse, &key.region)? * switch.installed_capacity
                }
            };
            let delta = capacity * input.config.capacity.full_load_hours / demand;
            trace!(
                region = %key.region,
                technology = %switch.technology_install,
                capacity,
                delta,
                "capacity converted to service share"
            );
            current = add_installed_share(&current, &switch.technology_install, delta);
            if !installed.contains(&switch.technology_install) {
                installed.push(switch.technology_install.clone());
            }
        }

        for technology in installed {
            derived.push(ServiceSwitch {
                enduse: key.enduse.clone(),
                scope: SwitchScope::Sector(key.sector.clone()),
                region: Some(key.region.clone()),
                service_share_ey: current.get(&technology).copied().unwrap_or(0.0),
                technology,
                switch_yr: year,
            });
        }
        out.insert(key.clone(), current);
    }

    debug!(year, derived = derived.len(), "capacity stage done");
    Ok(CapacityOutcome {
        table: out,
        derived,
    })
}

/// Raise `technology` by `delta` (capped at 1) and scale the others down.
fn add_installed_share(shares: &TechShares, technology: &TechId, delta: f64) -> TechShares {
    let old = shares.get(technology).copied().unwrap_or(0.0);
    let new = (old + delta).clamp(0.0, 1.0);
    let rest = 1.0 - old;

    let mut out: TechShares = shares
        .iter()
        .map(|(tech, share)| {
            let scaled = if rest > 0.0 {
                share * (1.0 - new) / rest
            } else {
                *share
            };
            (tech.clone(), scaled)
        })
        .collect();
    out.insert(technology.clone(), new);
    out
}

/// Apply explicit end-year service shares with auto-completion.
pub fn service_stage(
    input: &CascadeInput<'_>,
    table: &ShareTable,
    derived: &[ServiceSwitch],
    year: Year,
) -> CascadeResult<ShareTable> {
    let mut out = ShareTable::default();

    for (key, shares) in table.iter() {
        let query = input.query(key, year);
        let mut matched = match_switches(&input.switches.service, &query);
        // Regional switches override national ones.
        matched.sort_by_key(|s| s.region.is_some());

        let mut targets = TechShares::new();
        for switch in matched {
            let share_by = shares.get(&switch.technology).copied().unwrap_or(0.0);
            let target = if input.spatial.all_the_same || switch.region.is_some() {
                switch.service_share_ey
            } else {
                let factor = input.spatial.relative(Some(&key.enduse), &key.region);
                share_by + (switch.service_share_ey - share_by) * factor
            };
            targets.insert(switch.technology.clone(), target.clamp(0.0, 1.0));
        }
        for switch in match_switches(derived, &query) {
            if switch.region.as_ref() == Some(&key.region) {
                targets.insert(switch.technology.clone(), switch.service_share_ey);
            }
        }

        if targets.is_empty() {
            out.insert(key.clone(), shares.clone());
        } else {
            out.insert(key.clone(), complete_service_shares(shares, targets));
        }
    }

    Ok(out)
}

/// Fill the share left over by `targets` with the unswitched technologies,
/// proportionally to their current shares.
fn complete_service_shares(shares: &TechShares, mut targets: TechShares) -> TechShares {
    let total = share_sum(&targets);
    if total > 1.0 {
        targets.values_mut().for_each(|v| *v /= total);
    }

    let others: Vec<(&TechId, f64)> = shares
        .iter()
        .filter(|(tech, _)| !targets.contains_key(*tech))
        .map(|(tech, share)| (tech, *share))
        .collect();
    let residual = (1.0 - share_sum(&targets)).max(0.0);

    if others.is_empty() {
        let total = share_sum(&targets);
        if total > 0.0 {
            targets.values_mut().for_each(|v| *v /= total);
        }
        return targets;
    }

    let others_sum: f64 = others.iter().map(|(_, s)| s).sum();
    let count = others.len() as f64;
    for (tech, share) in others {
        let completed = if others_sum > 0.0 {
            share * residual / others_sum
        } else {
            residual / count
        };
        targets.insert(tech.clone(), completed);
    }
    targets
}

/// Move consumption of replaced fueltypes to installed technologies.
pub fn fuel_stage(
    input: &CascadeInput<'_>,
    table: &ShareTable,
    year: Year,
    mode: SwitchMode,
) -> CascadeResult<ShareTable> {
    let mut out = ShareTable::default();

    for (key, shares) in table.iter() {
        let matched = match_switches(&input.switches.fuel, &input.query(key, year));
        if matched.is_empty() {
            out.insert(key.clone(), shares.clone());
        } else {
            out.insert(key.clone(), apply_fuel_switches(input, shares, &matched, mode)?);
        }
    }

    Ok(out)
}

/// Every switch moves its fraction of the replaced fueltype's share in
/// `shares`, so the result does not depend on switch order.
fn apply_fuel_switches(
    input: &CascadeInput<'_>,
    shares: &TechShares,
    switches: &[&FuelSwitch],
    mode: SwitchMode,
) -> CascadeResult<TechShares> {
    let mut out = shares.clone();

    for switch in switches {
        let fraction = match mode {
            SwitchMode::Actual => switch.share_fuel_consumption_switched,
            SwitchMode::MaxTheoretical => switch.max_theoretical_switch,
        };

        let mut replaced = Vec::new();
        for (tech, share) in shares {
            if tech != &switch.technology_install
                && input.technology(tech)?.fueltype == switch.fueltype_replace
            {
                replaced.push((tech, *share));
            }
        }
        let fuel_total: f64 = replaced.iter().map(|(_, s)| s).sum();
        if fuel_total <= 0.0 {
            trace!(
                fueltype = %switch.fueltype_replace,
                technology = %switch.technology_install,
                "no service of replaced fueltype"
            );
            continue;
        }

        let change = fuel_total * fraction;
        for (tech, share) in replaced {
            *out.entry(tech.clone()).or_insert(0.0) -= change * share / fuel_total;
        }
        *out.entry(switch.technology_install.clone()).or_insert(0.0) += change;
    }

    Ok(out)
}

/// Ceiling `L` of the sigmoid of `technology` in the step of `year`.
///
/// Technologies installed by fuel switches reach the share obtained by
/// applying their switches at `max_theoretical_switch` to `after_service`,
/// the same table the fuel stage of that year starts from. Any other
/// technology is bounded by its `max_share`.
pub fn theoretical_maximum(
    input: &CascadeInput<'_>,
    after_service: &ShareTable,
    key: &ShareKey,
    year: Year,
    technology: &TechId,
) -> CascadeResult<f64> {
    let installing: Vec<&FuelSwitch> = match_switches(&input.switches.fuel, &input.query(key, year))
        .into_iter()
        .filter(|s| &s.technology_install == technology)
        .collect();

    if installing.is_empty() {
        return Ok(input.technology(technology)?.max_share);
    }

    let shares = after_service.get(key).cloned().unwrap_or_default();
    let maximum = apply_fuel_switches(input, &shares, &installing, SwitchMode::MaxTheoretical)?;
    Ok(maximum.get(technology).copied().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_core::{Fueltype, RegionId};
    use td_scenario::{BaseShareDef, CapacitySwitch, SpatialConfig};
    use td_spatial::calc_spatial_diffusion_factors;

    fn technologies() -> Vec<Technology> {
        [
            ("boiler_gas", Fueltype::Gas),
            ("boiler_condensing_gas", Fueltype::Gas),
            ("heat_pump", Fueltype::Electricity),
            ("storage_heater", Fueltype::Electricity),
            ("boiler_h2", Fueltype::Hydrogen),
        ]
        .into_iter()
        .map(|(name, fueltype)| Technology {
            name: name.into(),
            fueltype,
            market_entry: 1990,
            max_share: 1.0,
        })
        .collect()
    }

    fn indicators(fuel: &[(&str, f64)]) -> RegionalIndicators {
        RegionalIndicators {
            real_values: BTreeMap::new(),
            enduse_fuel: BTreeMap::from([(
                "space_heating".into(),
                fuel.iter().map(|(r, v)| (RegionId::from(*r), *v)).collect(),
            )]),
        }
    }

    fn base_table(regions: &[RegionId], shares: &[(&str, f64)]) -> ShareTable {
        ShareTable::from_base(
            regions,
            &[BaseShareDef {
                sector: "residential".into(),
                enduse: "space_heating".into(),
                shares: shares.iter().map(|(t, s)| (TechId::from(*t), *s)).collect(),
            }],
        )
    }

    fn fuel_switch(fraction: f64, max: f64) -> FuelSwitch {
        FuelSwitch {
            enduse: "space_heating".into(),
            scope: SwitchScope::Global,
            region: None,
            fueltype_replace: Fueltype::Gas,
            technology_install: "heat_pump".into(),
            switch_yr: 2030,
            share_fuel_consumption_switched: fraction,
            max_theoretical_switch: max,
        }
    }

    #[test]
    fn fuel_switch_moves_replaced_share() {
        let regions = vec![RegionId::from("r1")];
        let techs = technologies();
        let ind = indicators(&[("r1", 1.0)]);
        let config = ScenarioConfig::default();
        let spatial = calc_spatial_diffusion_factors(&regions, &ind, &config.spatial).unwrap();
        let switches = SwitchSet {
            fuel: vec![fuel_switch(0.5, 1.0)],
            ..Default::default()
        };
        let input = CascadeInput::new(&switches, &techs, &spatial, &ind, &config).unwrap();
        let base = base_table(&regions, &[("boiler_gas", 0.8), ("heat_pump", 0.2)]);

        let snapshots = resolve_cascade(&input, &base, 2030).unwrap();
        let key = ShareKey::new("r1", "residential", "space_heating");
        assert!((snapshots.after_fuel.share(&key, &"heat_pump".into()) - 0.6).abs() < 1e-12);
        assert!((snapshots.after_fuel.share(&key, &"boiler_gas".into()) - 0.4).abs() < 1e-12);
        assert_eq!(snapshots.after_service, base);

        let l = theoretical_maximum(&input, &base, &key, 2030, &"heat_pump".into()).unwrap();
        assert!((l - 1.0).abs() < 1e-12);
        let l_other =
            theoretical_maximum(&input, &base, &key, 2030, &"storage_heater".into()).unwrap();
        assert_eq!(l_other, 1.0);
    }

    #[test]
    fn fuel_switch_splits_by_share_within_fueltype() {
        let regions = vec![RegionId::from("r1")];
        let techs = technologies();
        let ind = indicators(&[("r1", 1.0)]);
        let config = ScenarioConfig::default();
        let spatial = calc_spatial_diffusion_factors(&regions, &ind, &config.spatial).unwrap();
        let switches = SwitchSet {
            fuel: vec![fuel_switch(0.5, 0.5)],
            ..Default::default()
        };
        let input = CascadeInput::new(&switches, &techs, &spatial, &ind, &config).unwrap();
        let base = base_table(
            &regions,
            &[
                ("boiler_gas", 0.6),
                ("boiler_condensing_gas", 0.2),
                ("storage_heater", 0.2),
            ],
        );

        let after = fuel_stage(&input, &base, 2030, SwitchMode::Actual).unwrap();
        let key = ShareKey::new("r1", "residential", "space_heating");
        let shares = after.get(&key).unwrap();
        assert!((shares[&TechId::from("heat_pump")] - 0.4).abs() < 1e-12);
        assert!((shares[&TechId::from("boiler_gas")] - 0.3).abs() < 1e-12);
        assert!((shares[&TechId::from("boiler_condensing_gas")] - 0.1).abs() < 1e-12);
        assert!((shares[&TechId::from("storage_heater")] - 0.2).abs() < 1e-12);
        after.check_conservation().unwrap();
    }

    #[test]
    fn switches_on_one_fueltype_take_fractions_of_the_original_share() {
        let regions = vec![RegionId::from("r1")];
        let techs = technologies();
        let ind = indicators(&[("r1", 1.0)]);
        let config = ScenarioConfig::default();
        let spatial = calc_spatial_diffusion_factors(&regions, &ind, &config.spatial).unwrap();
        let base = base_table(
            &regions,
            &[("boiler_gas", 0.8), ("heat_pump", 0.2), ("boiler_h2", 0.0)],
        );
        let to_h2 = FuelSwitch {
            technology_install: "boiler_h2".into(),
            ..fuel_switch(0.5, 0.5)
        };
        let key = ShareKey::new("r1", "residential", "space_heating");

        for fuel in [
            vec![fuel_switch(0.5, 0.5), to_h2.clone()],
            vec![to_h2.clone(), fuel_switch(0.5, 0.5)],
        ] {
            let switches = SwitchSet {
                fuel,
                ..Default::default()
            };
            let input = CascadeInput::new(&switches, &techs, &spatial, &ind, &config).unwrap();
            let after = fuel_stage(&input, &base, 2030, SwitchMode::Actual).unwrap();
            let shares = after.get(&key).unwrap();
            assert!((shares[&TechId::from("heat_pump")] - 0.6).abs() < 1e-12);
            assert!((shares[&TechId::from("boiler_h2")] - 0.4).abs() < 1e-12);
            assert!(shares[&TechId::from("boiler_gas")].abs() < 1e-12);
            after.check_conservation().unwrap();

            let l = theoretical_maximum(&input, &base, &key, 2030, &"heat_pump".into()).unwrap();
            assert!((l - 0.6).abs() < 1e-12);
        }
    }

    #[test]
    fn ceiling_covers_capacity_and_fuel_on_same_technology() {
        let regions = vec![RegionId::from("r1")];
        let techs = technologies();
        let ind = indicators(&[("r1", 100.0)]);
        let mut config = ScenarioConfig::default();
        config.capacity.full_load_hours = 1.0;
        let spatial = calc_spatial_diffusion_factors(&regions, &ind, &config.spatial).unwrap();
        let switches = SwitchSet {
            fuel: vec![fuel_switch(0.5, 0.5)],
            capacity: vec![CapacitySwitch {
                enduse: "space_heating".into(),
                scope: SwitchScope::Global,
                region: None,
                technology_install: "heat_pump".into(),
                switch_yr: 2030,
                installed_capacity: 20.0,
            }],
            ..Default::default()
        };
        let input = CascadeInput::new(&switches, &techs, &spatial, &ind, &config).unwrap();
        let base = base_table(&regions, &[("boiler_gas", 0.8), ("heat_pump", 0.2)]);

        let snapshots = resolve_cascade(&input, &base, 2030).unwrap();
        let key = ShareKey::new("r1", "residential", "space_heating");
        let heat_pump = TechId::from("heat_pump");
        // 20 / 100 adds 0.2, then half of the remaining 0.6 gas moves over.
        assert!((snapshots.after_service.share(&key, &heat_pump) - 0.4).abs() < 1e-12);
        let target = snapshots.after_fuel.share(&key, &heat_pump);
        assert!((target - 0.7).abs() < 1e-12);

        let l =
            theoretical_maximum(&input, &snapshots.after_service, &key, 2030, &heat_pump).unwrap();
        assert!((l - 0.7).abs() < 1e-12);
        assert!(target <= l + 1e-12);
    }

    #[test]
    fn switch_of_other_year_is_ignored() {
        let regions = vec![RegionId::from("r1")];
        let techs = technologies();
        let ind = indicators(&[("r1", 1.0)]);
        let config = ScenarioConfig::default();
        let spatial = calc_spatial_diffusion_factors(&regions, &ind, &config.spatial).unwrap();
        let switches = SwitchSet {
            fuel: vec![fuel_switch(0.5, 1.0)],
            ..Default::default()
        };
        let input = CascadeInput::new(&switches, &techs, &spatial, &ind, &config).unwrap();
        let base = base_table(&regions, &[("boiler_gas", 0.8), ("heat_pump", 0.2)]);

        let snapshots = resolve_cascade(&input, &base, 2040).unwrap();
        assert_eq!(snapshots.after_fuel, base);
    }

    #[test]
    fn service_targets_are_auto_completed() {
        let regions = vec![RegionId::from("r1")];
        let techs = technologies();
        let ind = indicators(&[("r1", 1.0)]);
        let config = ScenarioConfig::default();
        let spatial = calc_spatial_diffusion_factors(&regions, &ind, &config.spatial).unwrap();
        let switches = SwitchSet {
            service: vec![ServiceSwitch {
                enduse: "space_heating".into(),
                scope: SwitchScope::Sector("residential".into()),
                region: None,
                technology: "heat_pump".into(),
                switch_yr: 2030,
                service_share_ey: 0.6,
            }],
            ..Default::default()
        };
        let input = CascadeInput::new(&switches, &techs, &spatial, &ind, &config).unwrap();
        let base = base_table(
            &regions,
            &[("boiler_gas", 0.75), ("storage_heater", 0.25), ("heat_pump", 0.0)],
        );

        let snapshots = resolve_cascade(&input, &base, 2030).unwrap();
        let key = ShareKey::new("r1", "residential", "space_heating");
        let shares = snapshots.after_service.get(&key).unwrap();
        assert!((shares[&TechId::from("heat_pump")] - 0.6).abs() < 1e-12);
        assert!((shares[&TechId::from("boiler_gas")] - 0.3).abs() < 1e-12);
        assert!((shares[&TechId::from("storage_heater")] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn capacity_is_allocated_by_regional_fuel() {
        let regions = vec![RegionId::from("r1"), RegionId::from("r2")];
        let techs = technologies();
        let ind = indicators(&[("r1", 100.0), ("r2", 300.0)]);
        let mut config = ScenarioConfig::default();
        config.capacity.full_load_hours = 1.0;
        let spatial = calc_spatial_diffusion_factors(&regions, &ind, &SpatialConfig::default()).unwrap();
        let switches = SwitchSet {
            capacity: vec![CapacitySwitch {
                enduse: "space_heating".into(),
                scope: SwitchScope::Global,
                region: None,
                technology_install: "heat_pump".into(),
                switch_yr: 2030,
                installed_capacity: 40.0,
            }],
            ..Default::default()
        };
        let input = CascadeInput::new(&switches, &techs, &spatial, &ind, &config).unwrap();
        let base = base_table(&regions, &[("boiler_gas", 0.8), ("heat_pump", 0.2)]);

        let snapshots = resolve_cascade(&input, &base, 2030).unwrap();
        for region in ["r1", "r2"] {
            let key = ShareKey::new(region, "residential", "space_heating");
            let shares = snapshots.after_fuel.get(&key).unwrap();
            assert!((shares[&TechId::from("heat_pump")] - 0.3).abs() < 1e-12);
            assert!((shares[&TechId::from("boiler_gas")] - 0.7).abs() < 1e-12);
        }
        assert_eq!(snapshots.derived_service_switches.len(), 2);
        assert!(
            snapshots
                .derived_service_switches
                .iter()
                .all(|s| (s.service_share_ey - 0.3).abs() < 1e-12)
        );
    }

    #[test]
    fn conflicting_switches_are_rejected() {
        let regions = vec![RegionId::from("r1")];
        let techs = technologies();
        let ind = indicators(&[("r1", 1.0)]);
        let config = ScenarioConfig::default();
        let spatial = calc_spatial_diffusion_factors(&regions, &ind, &config.spatial).unwrap();
        let switches = SwitchSet {
            fuel: vec![fuel_switch(0.5, 1.0)],
            service: vec![ServiceSwitch {
                enduse: "space_heating".into(),
                scope: SwitchScope::Sector("residential".into()),
                region: None,
                technology: "storage_heater".into(),
                switch_yr: 2040,
                service_share_ey: 0.3,
            }],
            ..Default::default()
        };
        let err = CascadeInput::new(&switches, &techs, &spatial, &ind, &config).unwrap_err();
        assert_eq!(
            err,
            CascadeError::ConfigurationConflict {
                enduse: "space_heating".into(),
                sector: Some("residential".into()),
            }
        );
    }

    #[test]
    fn unknown_installed_technology_is_rejected() {
        let regions = vec![RegionId::from("r1")];
        let techs = technologies();
        let ind = indicators(&[("r1", 1.0)]);
        let config = ScenarioConfig::default();
        let spatial = calc_spatial_diffusion_factors(&regions, &ind, &config.spatial).unwrap();
        let mut switch = fuel_switch(0.5, 1.0);
        switch.technology_install = "fusion".into();
        let switches = SwitchSet {
            fuel: vec![switch],
            ..Default::default()
        };
        let err = CascadeInput::new(&switches, &techs, &spatial, &ind, &config).unwrap_err();
        assert!(matches!(err, CascadeError::UnknownTechnology { .. }));
    }
}
