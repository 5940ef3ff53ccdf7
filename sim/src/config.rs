use std::{fs, path::Path};

use anonymity::{DensityPolicy, KAnonymityEngine};
use anyhow::Context;
use location_obfuscation::{DEFAULT_EPSILONS, DEFAULT_SENSITIVITY};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub density: DensityExperiment,
    pub k_anonymity: KAnonExperiment,
    pub dp: DpExperiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityExperiment {
    pub grid_size: u32,
    /// Head-count scattered over the grid.
    pub population: u32,
    pub runs: usize,
    pub policy: DensityPolicy,
}

impl Default for DensityExperiment {
    fn default() -> Self {
        Self {
            grid_size: 5,
            population: 30,
            runs: 20,
            policy: DensityPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KAnonExperiment {
    pub grid_size: u32,
    pub users: u64,
    pub k_values: Vec<usize>,
    pub diagonal_probability: f64,
}

impl Default for KAnonExperiment {
    fn default() -> Self {
        Self {
            grid_size: 8,
            users: 25,
            k_values: vec![2, KAnonymityEngine::DEFAULT_K, 4, 5, 6],
            diagonal_probability: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpExperiment {
    pub city_size: f64,
    pub devices: usize,
    pub epsilons: Vec<f64>,
    pub sensitivity: f64,
}

impl Default for DpExperiment {
    fn default() -> Self {
        Self {
            city_size: 10.0,
            devices: 50,
            epsilons: DEFAULT_EPSILONS.to_vec(),
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

impl SimConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid simulation config")
    }

    /// Defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("could not read {}", path.display()))?;
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }
}
