use std::collections::BTreeMap;

use analyzer::{UtilityLoss, location_errors};
use geo_types::Point;
use location_obfuscation::{Obfuscator, PrivacyLevel};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::{
    config::DpExperiment,
    devices::{self, DeviceType},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DpRun {
    pub epsilon: f64,
    pub privacy_level: PrivacyLevel,
    pub utility: UtilityLoss,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DpResults {
    /// Base seed of the per-epsilon noise streams, drawn after device placement.
    pub noise_seed: u64,
    pub device_types: BTreeMap<DeviceType, usize>,
    pub runs: Vec<DpRun>,
}

pub fn run<R: Rng + ?Sized>(conf: &DpExperiment, rng: &mut R) -> anyhow::Result<DpResults> {
    let devices = devices::generate(conf.city_size, conf.devices, rng)?;
    let noise_seed: u64 = rng.random();
    let obfuscator =
        Obfuscator::seeded(conf.epsilons.iter().copied(), conf.sensitivity, noise_seed)?;

    let mut device_types = BTreeMap::new();
    for device in &devices {
        *device_types.entry(device.kind).or_insert(0) += 1;
    }
    let locations: Vec<Point<f64>> = devices.iter().map(|d| d.location).collect();

    let runs = obfuscator
        .sweep(&locations, noise_seed)?
        .into_iter()
        .map(|sweep| {
            let utility = UtilityLoss::from_errors(&location_errors(&locations, &sweep.noisy));
            info!(
                epsilon = sweep.epsilon.get(),
                level = %sweep.level,
                mean_error = utility.mean_error,
                median_error = utility.median_error,
                std_error = utility.std_error,
                max_error = utility.max_error,
                "differential privacy run"
            );
            DpRun {
                epsilon: sweep.epsilon.get(),
                privacy_level: sweep.level,
                utility,
            }
        })
        .collect();

    Ok(DpResults {
        noise_seed,
        device_types,
        runs,
    })
}
