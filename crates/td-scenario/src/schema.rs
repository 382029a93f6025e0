//! Scenario schema definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use td_core::{EnduseId, Fueltype, RegionId, SectorId, TechId, Year};

/// Complete input of one scenario run, as handed over by the loaders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDef {
    pub regions: Vec<RegionId>,
    #[serde(default)]
    pub technologies: Vec<Technology>,
    #[serde(default)]
    pub base_shares: Vec<BaseShareDef>,
    #[serde(default)]
    pub switches: SwitchSet,
    #[serde(default)]
    pub strategy_vars: Vec<StrategyVariable>,
    #[serde(default)]
    pub indicators: RegionalIndicators,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub name: TechId,
    pub fueltype: Fueltype,
    /// Year before which the technology holds no service share.
    pub market_entry: Year,
    /// Theoretical maximum service share within an enduse.
    #[serde(default = "default_max_share")]
    pub max_share: f64,
}

fn default_max_share() -> f64 {
    1.0
}

/// Base-year service shares of one `(sector, enduse)`, identical for all
/// regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseShareDef {
    pub sector: SectorId,
    pub enduse: EnduseId,
    pub shares: BTreeMap<TechId, f64>,
}

/// Sector applicability of a switch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<SectorId>", into = "Option<SectorId>")]
pub enum SwitchScope {
    /// Applies to every sector of the enduse.
    #[default]
    Global,
    Sector(SectorId),
}

impl SwitchScope {
    pub fn applies_to(&self, sector: &SectorId) -> bool {
        match self {
            SwitchScope::Global => true,
            SwitchScope::Sector(s) => s == sector,
        }
    }

    /// Whether some sector is covered by both scopes.
    pub fn overlaps(&self, other: &SwitchScope) -> bool {
        match (self, other) {
            (SwitchScope::Sector(a), SwitchScope::Sector(b)) => a == b,
            _ => true,
        }
    }

    pub fn sector(&self) -> Option<&SectorId> {
        match self {
            SwitchScope::Global => None,
            SwitchScope::Sector(s) => Some(s),
        }
    }
}

impl From<Option<SectorId>> for SwitchScope {
    fn from(sector: Option<SectorId>) -> Self {
        sector.map_or(SwitchScope::Global, SwitchScope::Sector)
    }
}

impl From<SwitchScope> for Option<SectorId> {
    fn from(scope: SwitchScope) -> Self {
        match scope {
            SwitchScope::Global => None,
            SwitchScope::Sector(s) => Some(s),
        }
    }
}

/// Common addressing of all switch kinds.
pub trait Scoped {
    fn enduse(&self) -> &EnduseId;
    fn scope(&self) -> &SwitchScope;
    /// `None` when the switch is not restricted to a region.
    fn region(&self) -> Option<&RegionId>;
    fn switch_yr(&self) -> Year;
}

/// Share of the consumption of one fueltype moved to an installed technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelSwitch {
    pub enduse: EnduseId,
    #[serde(default, rename = "sector")]
    pub scope: SwitchScope,
    #[serde(default)]
    pub region: Option<RegionId>,
    pub fueltype_replace: Fueltype,
    pub technology_install: TechId,
    pub switch_yr: Year,
    pub share_fuel_consumption_switched: f64,
    pub max_theoretical_switch: f64,
}

/// Explicit end-year service share of a technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSwitch {
    pub enduse: EnduseId,
    #[serde(default, rename = "sector")]
    pub scope: SwitchScope,
    #[serde(default)]
    pub region: Option<RegionId>,
    pub technology: TechId,
    pub switch_yr: Year,
    pub service_share_ey: f64,
}

/// Installed capacity of a technology, specified globally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacitySwitch {
    pub enduse: EnduseId,
    #[serde(default, rename = "sector")]
    pub scope: SwitchScope,
    #[serde(default)]
    pub region: Option<RegionId>,
    pub technology_install: TechId,
    pub switch_yr: Year,
    pub installed_capacity: f64,
}

macro_rules! impl_scoped {
    ($($ty:ty),*) => {
        $(impl Scoped for $ty {
            fn enduse(&self) -> &EnduseId {
                &self.enduse
            }
            fn scope(&self) -> &SwitchScope {
                &self.scope
            }
            fn region(&self) -> Option<&RegionId> {
                self.region.as_ref()
            }
            fn switch_yr(&self) -> Year {
                self.switch_yr
            }
        })*
    };
}

impl_scoped!(FuelSwitch, ServiceSwitch, CapacitySwitch);

/// Any switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Switch {
    Fuel(FuelSwitch),
    Service(ServiceSwitch),
    Capacity(CapacitySwitch),
}

impl Switch {
    fn inner(&self) -> &dyn Scoped {
        match self {
            Switch::Fuel(s) => s,
            Switch::Service(s) => s,
            Switch::Capacity(s) => s,
        }
    }
}

impl Scoped for Switch {
    fn enduse(&self) -> &EnduseId {
        self.inner().enduse()
    }
    fn scope(&self) -> &SwitchScope {
        self.inner().scope()
    }
    fn region(&self) -> Option<&RegionId> {
        self.inner().region()
    }
    fn switch_yr(&self) -> Year {
        self.inner().switch_yr()
    }
}

/// All switches of a scenario, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchSet {
    #[serde(default)]
    pub fuel: Vec<FuelSwitch>,
    #[serde(default)]
    pub service: Vec<ServiceSwitch>,
    #[serde(default)]
    pub capacity: Vec<CapacitySwitch>,
}

impl SwitchSet {
    pub fn is_empty(&self) -> bool {
        self.fuel.is_empty() && self.service.is_empty() && self.capacity.is_empty()
    }

    pub fn push(&mut self, switch: Switch) {
        match switch {
            Switch::Fuel(s) => self.fuel.push(s),
            Switch::Service(s) => self.service.push(s),
            Switch::Capacity(s) => self.capacity.push(s),
        }
    }

    /// Every switch, regardless of kind.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Scoped> + '_ {
        self.fuel
            .iter()
            .map(|s| s as &dyn Scoped)
            .chain(self.service.iter().map(|s| s as &dyn Scoped))
            .chain(self.capacity.iter().map(|s| s as &dyn Scoped))
    }
}

impl FromIterator<Switch> for SwitchSet {
    fn from_iter<I: IntoIterator<Item = Switch>>(iter: I) -> Self {
        let mut set = SwitchSet::default();
        for switch in iter {
            set.push(switch);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffusionChoice {
    Linear,
    #[default]
    Sigmoid,
}

/// One segment of a scenario variable's path between two control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSegment {
    pub base_yr: Year,
    pub end_yr: Year,
    pub value_by: f64,
    pub value_ey: f64,
    #[serde(default)]
    pub diffusion_choice: DiffusionChoice,
    #[serde(default)]
    pub regional_specific: bool,
    #[serde(default)]
    pub sig_midpoint: Option<f64>,
    #[serde(default)]
    pub sig_steepness: Option<f64>,
}

impl NarrativeSegment {
    pub fn midpoint(&self) -> f64 {
        self.sig_midpoint.unwrap_or(0.0)
    }

    pub fn steepness(&self) -> f64 {
        self.sig_steepness.unwrap_or(1.0)
    }

    pub fn contains(&self, year: Year) -> bool {
        (self.base_yr..=self.end_yr).contains(&year)
    }
}

/// A scalar scenario variable described by narrative segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyVariable {
    pub name: String,
    pub narratives: Vec<NarrativeSegment>,
    /// Enduse whose regional fuel weights the spatial distribution.
    #[serde(default)]
    pub affected_enduse: Option<EnduseId>,
    /// Regional values derive from spatial diffusion factors.
    #[serde(default)]
    pub spatially_modelled: bool,
}

impl StrategyVariable {
    /// Whether the variable yields one series per region. Decided by the
    /// first narrative segment.
    pub fn is_regional(&self) -> bool {
        self.narratives
            .first()
            .is_some_and(|segment| segment.regional_specific)
    }
}

/// Regional indicator data feeding the spatial factors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionalIndicators {
    /// Diffusion speed indicator per region (e.g. population density).
    #[serde(default)]
    pub real_values: BTreeMap<RegionId, f64>,
    /// Base-year fuel of every enduse per region, summed over fueltypes.
    #[serde(default)]
    pub enduse_fuel: BTreeMap<EnduseId, BTreeMap<RegionId, f64>>,
}
