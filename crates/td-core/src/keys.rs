//! Composite keys for share and parameter tables.
//!
//! Tables are keyed on these structs rather than on concatenated strings.

use crate::ids::{EnduseId, RegionId, SectorId, TechId, Year};

/// One `(region, sector, enduse)` share group. Technology shares under a
/// group sum to one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShareKey {
    pub region: RegionId,
    pub sector: SectorId,
    pub enduse: EnduseId,
}

impl ShareKey {
    pub fn new(
        region: impl Into<RegionId>,
        sector: impl Into<SectorId>,
        enduse: impl Into<EnduseId>,
    ) -> Self {
        Self {
            region: region.into(),
            sector: sector.into(),
            enduse: enduse.into(),
        }
    }

    pub fn tech(&self, technology: impl Into<TechId>) -> TechKey {
        TechKey {
            share: self.clone(),
            technology: technology.into(),
        }
    }
}

/// A technology inside a share group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TechKey {
    pub share: ShareKey,
    pub technology: TechId,
}

impl TechKey {
    pub fn year(&self, year: Year) -> ParamKey {
        ParamKey {
            tech: self.clone(),
            year,
        }
    }
}

/// Fully qualified annual parameter key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamKey {
    pub tech: TechKey,
    pub year: Year,
}
