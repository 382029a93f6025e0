//! Scenario validation logic.

use std::collections::{BTreeSet, HashSet};

use td_core::{EnduseId, RegionId, SectorId, TechId, sums_to_one};

use crate::config::ScenarioConfig;
use crate::schema::{ScenarioDef, Scoped, StrategyVariable, SwitchSet};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error(
        "Configuration conflict: fuel and service switches both defined for enduse '{enduse}' ({})",
        describe_sector(.sector)
    )]
    ConfigurationConflict {
        enduse: EnduseId,
        sector: Option<SectorId>,
    },

    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Unknown technology: {technology} in {context}")]
    UnknownTechnology { technology: TechId, context: String },

    #[error("Unknown region: {region} in {context}")]
    UnknownRegion { region: RegionId, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Base shares of sector '{sector}', enduse '{enduse}' sum to {sum}, expected 1")]
    ShareSum {
        sector: SectorId,
        enduse: EnduseId,
        sum: f64,
    },

    #[error("Narrative {index} of variable '{variable}': {reason}")]
    NarrativeOrder {
        variable: String,
        index: usize,
        reason: String,
    },
}

fn describe_sector(sector: &Option<SectorId>) -> String {
    match sector {
        Some(s) => format!("sector '{s}'"),
        None => "all sectors".to_string(),
    }
}

/// First `(enduse, sector)` on which a fuel switch and a service switch
/// overlap. `sector` is `None` when both apply to every sector.
pub fn find_switch_conflict(switches: &SwitchSet) -> Option<(EnduseId, Option<SectorId>)> {
    for fuel in &switches.fuel {
        for service in &switches.service {
            if fuel.enduse != service.enduse || !fuel.scope.overlaps(&service.scope) {
                continue;
            }
            if let (Some(a), Some(b)) = (&fuel.region, &service.region) {
                if a != b {
                    continue;
                }
            }
            let sector = fuel
                .scope
                .sector()
                .or_else(|| service.scope.sector())
                .cloned();
            return Some((fuel.enduse.clone(), sector));
        }
    }
    None
}

pub fn check_switch_exclusivity(switches: &SwitchSet) -> Result<(), ValidationError> {
    match find_switch_conflict(switches) {
        Some((enduse, sector)) => Err(ValidationError::ConfigurationConflict { enduse, sector }),
        None => Ok(()),
    }
}

pub fn validate_scenario(def: &ScenarioDef, config: &ScenarioConfig) -> Result<(), ValidationError> {
    config.validate()?;

    let mut regions = HashSet::new();
    for region in &def.regions {
        if !regions.insert(region) {
            return Err(ValidationError::DuplicateId {
                id: region.to_string(),
                context: "regions".to_string(),
            });
        }
    }

    let mut techs = HashSet::new();
    for tech in &def.technologies {
        if !techs.insert(&tech.name) {
            return Err(ValidationError::DuplicateId {
                id: tech.name.to_string(),
                context: "technologies".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&tech.max_share) {
            return Err(ValidationError::InvalidValue {
                field: format!("technologies.{}.max_share", tech.name),
                value: tech.max_share.to_string(),
                reason: "must be in [0, 1]".to_string(),
            });
        }
    }

    let mut groups = BTreeSet::new();
    for base in &def.base_shares {
        if !groups.insert((&base.sector, &base.enduse)) {
            return Err(ValidationError::DuplicateId {
                id: format!("{}/{}", base.sector, base.enduse),
                context: "base_shares".to_string(),
            });
        }
        for (tech, share) in &base.shares {
            require_tech(&techs, tech, "base_shares")?;
            require_fraction(*share, &format!("base_shares.{}.{}", base.enduse, tech))?;
        }
        let sum: f64 = base.shares.values().sum();
        if !sums_to_one(sum) {
            return Err(ValidationError::ShareSum {
                sector: base.sector.clone(),
                enduse: base.enduse.clone(),
                sum,
            });
        }
    }

    for switch in def.switches.iter() {
        if switch.switch_yr() <= config.base_yr {
            return Err(ValidationError::InvalidValue {
                field: format!("switch of enduse '{}' switch_yr", switch.enduse()),
                value: switch.switch_yr().to_string(),
                reason: format!("must be after base_yr {}", config.base_yr),
            });
        }
    }

    validate_switches(&def.switches, &regions, &techs)?;

    for var in &def.strategy_vars {
        validate_narratives(var)?;
    }

    Ok(())
}

fn validate_switches(
    switches: &SwitchSet,
    regions: &HashSet<&RegionId>,
    techs: &HashSet<&TechId>,
) -> Result<(), ValidationError> {
    for switch in switches.iter() {
        if let Some(region) = switch.region() {
            if !regions.contains(region) {
                return Err(ValidationError::UnknownRegion {
                    region: region.clone(),
                    context: format!("switch of enduse '{}'", switch.enduse()),
                });
            }
        }
    }

    for fuel in &switches.fuel {
        require_tech(techs, &fuel.technology_install, "fuel switch")?;
        require_fraction(
            fuel.share_fuel_consumption_switched,
            "fuel switch share_fuel_consumption_switched",
        )?;
        require_fraction(
            fuel.max_theoretical_switch,
            "fuel switch max_theoretical_switch",
        )?;
        if fuel.share_fuel_consumption_switched > fuel.max_theoretical_switch {
            return Err(ValidationError::InvalidValue {
                field: "fuel switch share_fuel_consumption_switched".to_string(),
                value: fuel.share_fuel_consumption_switched.to_string(),
                reason: format!(
                    "exceeds max_theoretical_switch {}",
                    fuel.max_theoretical_switch
                ),
            });
        }
    }

    for service in &switches.service {
        require_tech(techs, &service.technology, "service switch")?;
        require_fraction(service.service_share_ey, "service switch service_share_ey")?;
    }

    for capacity in &switches.capacity {
        require_tech(techs, &capacity.technology_install, "capacity switch")?;
        if !(capacity.installed_capacity >= 0.0 && capacity.installed_capacity.is_finite()) {
            return Err(ValidationError::InvalidValue {
                field: "capacity switch installed_capacity".to_string(),
                value: capacity.installed_capacity.to_string(),
                reason: "must be finite and >= 0".to_string(),
            });
        }
    }

    check_switch_exclusivity(switches)
}

/// Segments must be ordered and must not overlap.
pub fn validate_narratives(var: &StrategyVariable) -> Result<(), ValidationError> {
    for (index, segment) in var.narratives.iter().enumerate() {
        if segment.end_yr < segment.base_yr {
            return Err(ValidationError::NarrativeOrder {
                variable: var.name.clone(),
                index,
                reason: format!(
                    "end_yr {} precedes base_yr {}",
                    segment.end_yr, segment.base_yr
                ),
            });
        }
        if index > 0 {
            let prev = &var.narratives[index - 1];
            if prev.end_yr > segment.base_yr {
                return Err(ValidationError::NarrativeOrder {
                    variable: var.name.clone(),
                    index,
                    reason: format!(
                        "base_yr {} precedes end_yr {} of the previous segment",
                        segment.base_yr, prev.end_yr
                    ),
                });
            }
        }
    }
    Ok(())
}

fn require_tech(techs: &HashSet<&TechId>, tech: &TechId, context: &str) -> Result<(), ValidationError> {
    if techs.contains(tech) {
        Ok(())
    } else {
        Err(ValidationError::UnknownTechnology {
            technology: tech.clone(),
            context: context.to_string(),
        })
    }
}

fn require_fraction(value: f64, field: &str) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be in [0, 1]".to_string(),
        })
    }
}
