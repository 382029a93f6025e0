//! Scenario run orchestration.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use td_annual::{
    AnnualTechShares, GeneratedVariable, curve_params, generate_annual_param_vals,
    generate_annual_tech_shares, plan_tech_diffusion,
};
use td_core::{EnduseId, ParamKey, RegionId, TechId, Year};
use td_fit::DiffusionCurveParams;
use td_scenario::Scoped;
use td_spatial::{SpatialFactors, calc_spatial_diffusion_factors};
use td_switch::{CascadeInput, CascadeSnapshots, ShareTable, resolve_cascade};
use tracing::info;

use crate::context::ScenarioContext;
use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage};

/// Regional split of one global capacity switch.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityAllocation {
    pub enduse: EnduseId,
    pub technology: TechId,
    pub switch_yr: Year,
    pub regional: BTreeMap<RegionId, f64>,
}

/// Everything a scenario run produces.
#[derive(Debug, Clone)]
pub struct ScenarioOutput {
    pub spatial: SpatialFactors,
    pub capacity_allocations: Vec<CapacityAllocation>,
    /// Cascade tables per narrative timestep.
    pub snapshots: BTreeMap<Year, CascadeSnapshots>,
    /// Fitted curves keyed by technology and step end year.
    pub curve_params: BTreeMap<ParamKey, DiffusionCurveParams>,
    pub annual_tech_shares: AnnualTechShares,
    pub annual_parameters: BTreeMap<String, GeneratedVariable>,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Run a scenario.
pub fn run_scenario(ctx: &ScenarioContext) -> AppResult<ScenarioOutput> {
    run_scenario_with_progress(ctx, None)
}

/// Run a scenario and report each stage to `progress_cb`.
///
/// Any stage error aborts the run; no partial output is returned.
pub fn run_scenario_with_progress(
    ctx: &ScenarioContext,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<ScenarioOutput> {
    let started = Instant::now();
    let def = ctx.def();
    let config = ctx.config();
    let years = config.simulated_years();

    emit_progress(&mut progress_cb, RunStage::ComputingSpatialFactors, started, None);
    let spatial = calc_spatial_diffusion_factors(&def.regions, &def.indicators, &config.spatial)?;

    emit_progress(
        &mut progress_cb,
        RunStage::RegionalisingNarratives,
        started,
        Some(format!("{} variables", def.strategy_vars.len())),
    );
    let mut annual_parameters = BTreeMap::new();
    for var in &def.strategy_vars {
        let generated = generate_annual_param_vals(var, &def.regions, &spatial, &years)?;
        annual_parameters.insert(var.name.clone(), generated);
    }

    let step_years: BTreeSet<Year> = def
        .switches
        .iter()
        .map(|s| s.switch_yr())
        .filter(|y| *y > config.base_yr)
        .collect();
    emit_progress(
        &mut progress_cb,
        RunStage::ResolvingCascade,
        started,
        Some(format!("{} timesteps", step_years.len())),
    );
    let mut capacity_allocations = Vec::new();
    for switch in def.switches.capacity.iter().filter(|s| s.region.is_none()) {
        capacity_allocations.push(CapacityAllocation {
            enduse: switch.enduse.clone(),
            technology: switch.technology_install.clone(),
            switch_yr: switch.switch_yr,
            regional: spatial.allocate(&switch.enduse, switch.installed_capacity)?,
        });
    }

    let input = CascadeInput::new(
        &def.switches,
        &def.technologies,
        &spatial,
        &def.indicators,
        config,
    )?;
    let base = ShareTable::from_base(&def.regions, &def.base_shares);
    let mut snapshots = BTreeMap::new();
    for year in step_years {
        snapshots.insert(year, resolve_cascade(&input, &base, year)?);
    }

    emit_progress(&mut progress_cb, RunStage::FittingCurves, started, None);
    let groups = plan_tech_diffusion(&input, &base, &snapshots, config)?;
    let curve_params = curve_params(&groups);

    emit_progress(&mut progress_cb, RunStage::GeneratingAnnualValues, started, None);
    let annual_tech_shares = generate_annual_tech_shares(&groups, &years, config.fit.year_offset)?;

    info!(
        regions = def.regions.len(),
        years = years.len(),
        curves = curve_params.len(),
        entries = annual_tech_shares.len(),
        elapsed_s = started.elapsed().as_secs_f64(),
        "scenario run completed"
    );
    emit_progress(&mut progress_cb, RunStage::Completed, started, None);

    Ok(ScenarioOutput {
        spatial,
        capacity_allocations,
        snapshots,
        curve_params,
        annual_tech_shares,
        annual_parameters,
    })
}
