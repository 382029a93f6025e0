//! Expansion of strategy variable narratives into annual values.

use std::collections::BTreeMap;

use rayon::prelude::*;
use td_core::{RegionId, Year};
use td_fit::{linear_diff, sigmoid_diffusion};
use td_scenario::{DiffusionChoice, NarrativeSegment, StrategyVariable, validate_narratives};
use td_spatial::SpatialFactors;
use tracing::{debug, warn};

use crate::error::AnnualResult;

/// Narrative segments of a variable, shared or resolved per region.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionalNarratives {
    Shared(Vec<NarrativeSegment>),
    PerRegion(BTreeMap<RegionId, Vec<NarrativeSegment>>),
}

/// Annual values of a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableSeries {
    Shared(BTreeMap<Year, f64>),
    PerRegion(BTreeMap<RegionId, BTreeMap<Year, f64>>),
}

impl VariableSeries {
    /// Value of `region` in `year`; shared series ignore the region.
    pub fn value(&self, region: &RegionId, year: Year) -> Option<f64> {
        match self {
            VariableSeries::Shared(values) => values.get(&year).copied(),
            VariableSeries::PerRegion(regions) => {
                regions.get(region).and_then(|values| values.get(&year)).copied()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedVariable {
    pub name: String,
    pub series: VariableSeries,
    /// Simulated years outside every narrative segment; left unset.
    pub uncovered: Vec<Year>,
}

/// Resolve the regional segment values of `var`.
///
/// Regional segments are scaled by the enduse-normalized diffusion factor of
/// each region when the variable is spatially modelled, and copied to every
/// region otherwise.
pub fn regionalise_narratives(
    var: &StrategyVariable,
    regions: &[RegionId],
    spatial: &SpatialFactors,
) -> RegionalNarratives {
    if !var.is_regional() {
        return RegionalNarratives::Shared(var.narratives.clone());
    }

    let per_region = regions
        .iter()
        .map(|region| {
            let factor = if var.spatially_modelled {
                spatial.relative(var.affected_enduse.as_ref(), region)
            } else {
                1.0
            };
            let segments = var
                .narratives
                .iter()
                .map(|segment| {
                    let mut segment = segment.clone();
                    if segment.regional_specific {
                        segment.value_by *= factor;
                        segment.value_ey *= factor;
                    }
                    segment
                })
                .collect();
            (region.clone(), segments)
        })
        .collect();
    RegionalNarratives::PerRegion(per_region)
}

/// Value of a segment in `year`.
pub fn segment_value(segment: &NarrativeSegment, year: Year) -> f64 {
    match segment.diffusion_choice {
        DiffusionChoice::Linear => linear_diff(
            segment.base_yr,
            year,
            segment.end_yr,
            segment.value_by,
            segment.value_ey,
        ),
        DiffusionChoice::Sigmoid => {
            let fraction = sigmoid_diffusion(
                segment.base_yr,
                year,
                segment.end_yr,
                segment.midpoint(),
                segment.steepness(),
            );
            segment.value_by + (segment.value_ey - segment.value_by) * fraction
        }
    }
}

/// Annual values of `segments` for `years`, plus the years no segment covers.
///
/// Segments are applied in order, so a shared boundary year takes the value
/// of the later segment.
pub fn expand_segments(segments: &[NarrativeSegment], years: &[Year]) -> (BTreeMap<Year, f64>, Vec<Year>) {
    let mut values = BTreeMap::new();
    for segment in segments {
        for &year in years.iter().filter(|y| segment.contains(**y)) {
            values.insert(year, segment_value(segment, year));
        }
    }
    let uncovered = years
        .iter()
        .copied()
        .filter(|y| !values.contains_key(y))
        .collect();
    (values, uncovered)
}

/// Generate the annual values of one strategy variable.
pub fn generate_annual_param_vals(
    var: &StrategyVariable,
    regions: &[RegionId],
    spatial: &SpatialFactors,
    years: &[Year],
) -> AnnualResult<GeneratedVariable> {
    validate_narratives(var)?;

    let (series, uncovered) = match regionalise_narratives(var, regions, spatial) {
        RegionalNarratives::Shared(segments) => {
            let (values, uncovered) = expand_segments(&segments, years);
            (VariableSeries::Shared(values), uncovered)
        }
        RegionalNarratives::PerRegion(per_region) => {
            let expanded: Vec<(RegionId, BTreeMap<Year, f64>, Vec<Year>)> = per_region
                .par_iter()
                .map(|(region, segments)| {
                    let (values, uncovered) = expand_segments(segments, years);
                    (region.clone(), values, uncovered)
                })
                .collect();
            // Coverage depends on segment years only, identical for every region.
            let uncovered = expanded
                .first()
                .map(|(_, _, uncovered)| uncovered.clone())
                .unwrap_or_default();
            let values = expanded
                .into_iter()
                .map(|(region, values, _)| (region, values))
                .collect();
            (VariableSeries::PerRegion(values), uncovered)
        }
    };

    if !uncovered.is_empty() {
        warn!(
            variable = %var.name,
            first = uncovered[0],
            count = uncovered.len(),
            "simulated years outside all narrative segments left unset"
        );
    }
    debug!(variable = %var.name, regional = var.is_regional(), "annual values generated");

    Ok(GeneratedVariable {
        name: var.name.clone(),
        series,
        uncovered,
    })
}
