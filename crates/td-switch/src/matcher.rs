//! Selection of the switches that apply to a share group.

use std::collections::BTreeSet;

use td_core::{EnduseId, RegionId, SectorId, Year};
use td_scenario::{CapacitySwitch, FuelSwitch, Scoped, ServiceSwitch, SwitchSet};

/// Address of a lookup. `region` and `year` are optional filters.
#[derive(Debug, Clone, Copy)]
pub struct SwitchQuery<'a> {
    pub enduse: &'a EnduseId,
    pub sector: &'a SectorId,
    pub region: Option<&'a RegionId>,
    pub year: Option<Year>,
}

impl<'a> SwitchQuery<'a> {
    pub fn new(enduse: &'a EnduseId, sector: &'a SectorId) -> Self {
        Self {
            enduse,
            sector,
            region: None,
            year: None,
        }
    }

    pub fn in_region(mut self, region: &'a RegionId) -> Self {
        self.region = Some(region);
        self
    }

    pub fn in_year(mut self, year: Year) -> Self {
        self.year = Some(year);
        self
    }

    pub fn accepts(&self, switch: &dyn Scoped) -> bool {
        if switch.enduse() != self.enduse || !switch.scope().applies_to(self.sector) {
            return false;
        }
        if let (Some(wanted), Some(own)) = (self.region, switch.region()) {
            if wanted != own {
                return false;
            }
        }
        self.year.is_none_or(|year| switch.switch_yr() == year)
    }
}

/// Every switch of `switches` accepted by `query`, in input order.
pub fn match_switches<'s, S: Scoped>(switches: &'s [S], query: &SwitchQuery<'_>) -> Vec<&'s S> {
    switches.iter().filter(|s| query.accepts(*s)).collect()
}

/// Matching switches of every kind.
#[derive(Debug, Clone, Default)]
pub struct MatchedSwitches<'s> {
    pub fuel: Vec<&'s FuelSwitch>,
    pub service: Vec<&'s ServiceSwitch>,
    pub capacity: Vec<&'s CapacitySwitch>,
}

impl MatchedSwitches<'_> {
    pub fn is_empty(&self) -> bool {
        self.fuel.is_empty() && self.service.is_empty() && self.capacity.is_empty()
    }
}

pub fn match_switch_set<'s>(set: &'s SwitchSet, query: &SwitchQuery<'_>) -> MatchedSwitches<'s> {
    MatchedSwitches {
        fuel: match_switches(&set.fuel, query),
        service: match_switches(&set.service, query),
        capacity: match_switches(&set.capacity, query),
    }
}

/// Ordered switch years of an `(enduse, sector)`, over all regions.
pub fn narrative_timesteps(set: &SwitchSet, enduse: &EnduseId, sector: &SectorId) -> Vec<Year> {
    let query = SwitchQuery::new(enduse, sector);
    set.iter()
        .filter(|s| query.accepts(*s))
        .map(|s| s.switch_yr())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
