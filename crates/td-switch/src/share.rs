//! Service share tables.

use std::collections::BTreeMap;

use td_core::{RegionId, ShareKey, TechId, sums_to_one};
use td_scenario::BaseShareDef;

use crate::error::{CascadeError, CascadeResult};

/// Service shares of the technologies of one group.
pub type TechShares = BTreeMap<TechId, f64>;

pub fn share_sum(shares: &TechShares) -> f64 {
    shares.values().sum()
}

/// Service shares per `(region, sector, enduse)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareTable {
    groups: BTreeMap<ShareKey, TechShares>,
}

impl ShareTable {
    /// Base-year table: every region starts from the same shares.
    pub fn from_base(regions: &[RegionId], base: &[BaseShareDef]) -> Self {
        let mut groups = BTreeMap::new();
        for region in regions {
            for def in base {
                let key = ShareKey::new(region.clone(), def.sector.clone(), def.enduse.clone());
                groups.insert(key, def.shares.clone());
            }
        }
        Self { groups }
    }

    pub fn get(&self, key: &ShareKey) -> Option<&TechShares> {
        self.groups.get(key)
    }

    pub fn share(&self, key: &ShareKey, technology: &TechId) -> f64 {
        self.groups
            .get(key)
            .and_then(|shares| shares.get(technology))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn insert(&mut self, key: ShareKey, shares: TechShares) {
        self.groups.insert(key, shares);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ShareKey, &TechShares)> {
        self.groups.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ShareKey> {
        self.groups.keys()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every group must sum to one within [`td_core::SHARE_SUM_TOL`].
    pub fn check_conservation(&self) -> CascadeResult<()> {
        for (key, shares) in &self.groups {
            check_group(key, shares)?;
        }
        Ok(())
    }
}

impl FromIterator<(ShareKey, TechShares)> for ShareTable {
    fn from_iter<I: IntoIterator<Item = (ShareKey, TechShares)>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

pub fn check_group(key: &ShareKey, shares: &TechShares) -> CascadeResult<()> {
    let sum = share_sum(shares);
    if !sums_to_one(sum) {
        return Err(CascadeError::ShareConservationViolation {
            region: key.region.clone(),
            sector: key.sector.clone(),
            enduse: key.enduse.clone(),
            sum,
        });
    }
    Ok(())
}
