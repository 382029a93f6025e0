//! Annual technology service shares from cascade targets and fitted curves.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use td_core::{ParamKey, ShareKey, TechId, TechKey, Year, lerp};
use td_fit::{
    DiffusionCurveParams, FitJob, FitPlan, FitPoint, fit_batch, linear_fraction, plan_fit,
};
use td_scenario::{DiffusionChoice, ScenarioConfig};
use td_switch::{
    CascadeInput, CascadeSnapshots, ShareTable, TechShares, check_group, narrative_timesteps,
    theoretical_maximum,
};
use tracing::{debug, info};

use crate::error::{AnnualError, AnnualResult};

/// Path of an installed technology within one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TechCurve {
    Sigmoid(DiffusionCurveParams),
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstalledCurve {
    pub curve: TechCurve,
    /// Share is zero before this year.
    pub market_entry: Year,
}

/// Transition of one group between two narrative timesteps.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionStep {
    pub from_year: Year,
    pub to_year: Year,
    pub start: TechShares,
    pub target: TechShares,
    /// Technologies whose share increases in this step.
    pub curves: BTreeMap<TechId, InstalledCurve>,
}

impl DiffusionStep {
    /// Shares in `year`, for `from_year < year <= to_year`.
    ///
    /// Installed technologies follow their curves. A technology entering the
    /// market inside the step holds 0 until its entry year and starts there
    /// at the negligible share its curve was fitted through. The others move
    /// together by the progress of the installed ones, which keeps the
    /// group summing to one.
    pub fn shares_at(&self, year: Year, year_offset: Year) -> TechShares {
        if year >= self.to_year {
            return self.target.clone();
        }
        let t = linear_fraction(self.from_year, year, self.to_year);

        let mut shares = TechShares::new();
        let (mut installed_now, mut installed_start, mut installed_end) = (0.0, 0.0, 0.0);
        for (tech, installed) in &self.curves {
            let s0 = self.start.get(tech).copied().unwrap_or(0.0);
            let s1 = self.target.get(tech).copied().unwrap_or(0.0);
            let value = if year < installed.market_entry {
                0.0
            } else {
                match installed.curve {
                    TechCurve::Sigmoid(params) => params.evaluate(year, year_offset),
                    TechCurve::Linear => lerp(s0, s1, t),
                }
            };
            installed_now += value;
            installed_start += s0;
            installed_end += s1;
            shares.insert(tech.clone(), value);
        }

        let progress = if (installed_end - installed_start).abs() > f64::EPSILON {
            (installed_now - installed_start) / (installed_end - installed_start)
        } else {
            t
        };

        let others: BTreeSet<&TechId> = self
            .start
            .keys()
            .chain(self.target.keys())
            .filter(|tech| !self.curves.contains_key(*tech))
            .collect();
        for tech in others {
            let s0 = self.start.get(tech).copied().unwrap_or(0.0);
            let s1 = self.target.get(tech).copied().unwrap_or(0.0);
            shares.insert(tech.clone(), s0 + (s1 - s0) * progress);
        }
        shares
    }
}

/// All diffusion steps of one `(region, sector, enduse)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDiffusion {
    pub key: ShareKey,
    pub base_yr: Year,
    pub base: TechShares,
    pub steps: Vec<DiffusionStep>,
}

impl GroupDiffusion {
    /// Shares in `year`. Held at the base shares before the first step and
    /// at the last target after the last one.
    pub fn shares_at(&self, year: Year, year_offset: Year) -> TechShares {
        if year <= self.base_yr {
            return self.base.clone();
        }
        for step in &self.steps {
            if year <= step.to_year {
                return step.shares_at(year, year_offset);
            }
        }
        self.steps
            .last()
            .map_or_else(|| self.base.clone(), |step| step.target.clone())
    }
}

/// Build the diffusion steps of every group and fit the sigmoid curves of
/// all installed technologies.
///
/// `snapshots` holds the cascade result of every narrative timestep.
pub fn plan_tech_diffusion(
    input: &CascadeInput<'_>,
    base: &ShareTable,
    snapshots: &BTreeMap<Year, CascadeSnapshots>,
    config: &ScenarioConfig,
) -> AnnualResult<Vec<GroupDiffusion>> {
    let mut groups = Vec::with_capacity(base.len());
    let mut jobs = Vec::new();
    // (group index, step index, technology, market entry) of every job
    let mut pending = Vec::new();

    for (key, base_shares) in base.iter() {
        let timesteps = narrative_timesteps(input.switches(), &key.enduse, &key.sector);
        let mut steps = Vec::with_capacity(timesteps.len());
        let mut from_year = config.base_yr;
        let mut start = base_shares.clone();

        for year in timesteps.into_iter().filter(|y| *y > config.base_yr) {
            let snapshot = snapshots
                .get(&year)
                .ok_or(AnnualError::MissingStep { year })?;
            let target = snapshot
                .after_fuel
                .get(key)
                .cloned()
                .unwrap_or_else(|| start.clone());

            let techs: BTreeSet<&TechId> = start.keys().chain(target.keys()).collect();
            let mut curves = BTreeMap::new();
            for tech in techs {
                let s0 = start.get(tech).copied().unwrap_or(0.0);
                let s1 = target.get(tech).copied().unwrap_or(0.0);
                if s1 <= s0 {
                    continue;
                }

                let market_entry = input.technology(tech)?.market_entry;
                let plan = match config.tech_diffusion {
                    DiffusionChoice::Linear => FitPlan::Linear,
                    DiffusionChoice::Sigmoid => {
                        let l_parameter =
                            theoretical_maximum(input, &snapshot.after_service, key, year, tech)?;
                        plan_fit(
                            FitPoint::new(from_year, s0),
                            FitPoint::new(year, s1),
                            l_parameter,
                            market_entry,
                            &config.fit,
                        )
                    }
                };

                match plan {
                    FitPlan::Sigmoid {
                        start,
                        end,
                        l_parameter,
                    } => {
                        pending.push((groups.len(), steps.len(), tech.clone(), market_entry));
                        jobs.push(FitJob {
                            key: key.tech(tech.clone()),
                            start,
                            end,
                            l_parameter,
                        });
                    }
                    FitPlan::Linear => {
                        curves.insert(
                            tech.clone(),
                            InstalledCurve {
                                curve: TechCurve::Linear,
                                market_entry,
                            },
                        );
                    }
                }
            }

            steps.push(DiffusionStep {
                from_year,
                to_year: year,
                start: start.clone(),
                target: target.clone(),
                curves,
            });
            from_year = year;
            start = target;
        }

        groups.push(GroupDiffusion {
            key: key.clone(),
            base_yr: config.base_yr,
            base: base_shares.clone(),
            steps,
        });
    }

    info!(groups = groups.len(), fits = jobs.len(), "fitting diffusion curves");
    let fitted = fit_batch(&jobs, &config.fit)?;

    for ((group, step, tech, market_entry), params) in pending.into_iter().zip(fitted) {
        groups[group].steps[step].curves.insert(
            tech,
            InstalledCurve {
                curve: TechCurve::Sigmoid(params),
                market_entry,
            },
        );
    }
    Ok(groups)
}

/// Fitted curves keyed by technology and the end year of their step.
pub fn curve_params(groups: &[GroupDiffusion]) -> BTreeMap<ParamKey, DiffusionCurveParams> {
    let mut params = BTreeMap::new();
    for group in groups {
        for step in &group.steps {
            for (tech, installed) in &step.curves {
                if let TechCurve::Sigmoid(p) = installed.curve {
                    params.insert(group.key.tech(tech.clone()).year(step.to_year), p);
                }
            }
        }
    }
    params
}

/// Technology service share per `(region, sector, enduse, technology, year)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnualTechShares {
    values: BTreeMap<ParamKey, f64>,
}

impl AnnualTechShares {
    pub fn get(&self, key: &ParamKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn share(&self, tech: &TechKey, year: Year) -> Option<f64> {
        self.get(&tech.year(year))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, f64)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Materialize the shares of every group for every year in `years`.
///
/// Each year's shares are checked for conservation.
pub fn generate_annual_tech_shares(
    groups: &[GroupDiffusion],
    years: &[Year],
    year_offset: Year,
) -> AnnualResult<AnnualTechShares> {
    let per_group = groups
        .par_iter()
        .map(|group| -> AnnualResult<Vec<(ParamKey, f64)>> {
            let mut values = Vec::with_capacity(years.len() * group.base.len());
            for &year in years {
                let shares = group.shares_at(year, year_offset);
                check_group(&group.key, &shares)?;
                let tech_year = |tech: TechId| group.key.tech(tech).year(year);
                values.extend(shares.into_iter().map(|(tech, v)| (tech_year(tech), v)));
            }
            Ok(values)
        })
        .collect::<AnnualResult<Vec<_>>>()?;

    let values: BTreeMap<ParamKey, f64> = per_group.into_iter().flatten().collect();
    debug!(entries = values.len(), "annual technology shares generated");
    Ok(AnnualTechShares { values })
}
