//! Share conservation across the switch cascade.

use std::collections::BTreeMap;

use proptest::prelude::*;
use td_core::{Fueltype, RegionId, SHARE_SUM_TOL, ShareKey, TechId};
use td_scenario::{
    BaseShareDef, CapacitySwitch, FuelSwitch, RegionalIndicators, ScenarioConfig, ServiceSwitch,
    SwitchScope, SwitchSet, Technology,
};
use td_spatial::calc_spatial_diffusion_factors;
use td_switch::{CascadeInput, ShareTable, resolve_cascade, share_sum, theoretical_maximum};

const TECHS: [(&str, Fueltype); 4] = [
    ("boiler_gas", Fueltype::Gas),
    ("boiler_oil", Fueltype::Oil),
    ("heat_pump", Fueltype::Electricity),
    ("district_heating", Fueltype::Heat),
];

fn technologies() -> Vec<Technology> {
    TECHS
        .iter()
        .map(|(name, fueltype)| Technology {
            name: (*name).into(),
            fueltype: *fueltype,
            market_entry: 1990,
            max_share: 1.0,
        })
        .collect()
}

fn base(weights: &[f64]) -> Vec<BaseShareDef> {
    let total: f64 = weights.iter().sum();
    let shares: BTreeMap<TechId, f64> = TECHS
        .iter()
        .zip(weights)
        .map(|((name, _), w)| (TechId::from(*name), w / total))
        .collect();
    ["space_heating", "water_heating"]
        .into_iter()
        .map(|enduse| BaseShareDef {
            sector: "residential".into(),
            enduse: enduse.into(),
            shares: shares.clone(),
        })
        .collect()
}

fn indicators(regions: &[RegionId], fuel: &[f64]) -> RegionalIndicators {
    let per_region: BTreeMap<RegionId, f64> =
        regions.iter().cloned().zip(fuel.iter().copied()).collect();
    RegionalIndicators {
        real_values: regions.iter().cloned().zip(fuel.iter().copied()).collect(),
        enduse_fuel: BTreeMap::from([
            ("space_heating".into(), per_region.clone()),
            ("water_heating".into(), per_region),
        ]),
    }
}

fn gas_switch(install: &str, fraction: f64) -> FuelSwitch {
    FuelSwitch {
        enduse: "space_heating".into(),
        scope: SwitchScope::Global,
        region: None,
        fueltype_replace: Fueltype::Gas,
        technology_install: install.into(),
        switch_yr: 2030,
        share_fuel_consumption_switched: fraction,
        max_theoretical_switch: 1.0,
    }
}

proptest! {
    #[test]
    fn shares_sum_to_one_after_every_stage(
        weights in prop::collection::vec(0.01f64..1.0, 4),
        fuel in prop::collection::vec(1.0f64..1000.0, 3),
        fraction in 0.0f64..1.0,
        split in 0.0f64..1.0,
        target in 0.0f64..1.0,
        capacity in 0.0f64..0.5,
        spatial_explicit in any::<bool>(),
    ) {
        let regions: Vec<RegionId> = ["r1", "r2", "r3"].into_iter().map(RegionId::from).collect();
        let techs = technologies();
        let ind = indicators(&regions, &fuel);
        let mut config = ScenarioConfig::default();
        config.capacity.full_load_hours = 1.0;
        config.spatial.spatial_explicit_diffusion = spatial_explicit;
        config.spatial.speed_con_max = 2.0;
        let spatial = calc_spatial_diffusion_factors(&regions, &ind, &config.spatial).unwrap();

        let switches = SwitchSet {
            fuel: vec![
                gas_switch("heat_pump", fraction),
                gas_switch("boiler_oil", (1.0 - fraction) * split),
            ],
            service: vec![ServiceSwitch {
                enduse: "water_heating".into(),
                scope: SwitchScope::Global,
                region: None,
                technology: "district_heating".into(),
                switch_yr: 2030,
                service_share_ey: target,
            }],
            capacity: vec![CapacitySwitch {
                enduse: "space_heating".into(),
                scope: SwitchScope::Global,
                region: None,
                technology_install: "heat_pump".into(),
                switch_yr: 2030,
                installed_capacity: capacity * fuel.iter().sum::<f64>(),
            }],
        };
        let input = CascadeInput::new(&switches, &techs, &spatial, &ind, &config).unwrap();
        let table = ShareTable::from_base(&regions, &base(&weights));

        let snapshots = resolve_cascade(&input, &table, 2030).unwrap();
        for stage in [&snapshots.after_capacity, &snapshots.after_service, &snapshots.after_fuel] {
            for (_, shares) in stage.iter() {
                prop_assert!((share_sum(shares) - 1.0).abs() <= SHARE_SUM_TOL);
                prop_assert!(shares.values().all(|s| *s >= -SHARE_SUM_TOL));
            }
        }

        // Capacity and fuel both install heat pumps; the ceiling covers both.
        let heat_pump = TechId::from("heat_pump");
        for region in &regions {
            let key = ShareKey::new(region.clone(), "residential", "space_heating");
            let target = snapshots.after_fuel.share(&key, &heat_pump);
            let l = theoretical_maximum(&input, &snapshots.after_service, &key, 2030, &heat_pump)
                .unwrap();
            prop_assert!(target <= l + SHARE_SUM_TOL);
        }
    }
}
