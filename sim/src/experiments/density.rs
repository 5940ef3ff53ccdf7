use analyzer::mean;
use anonymity::{DensityAwareEngine, DensityClass};
use city_graph::{NodeId, Population, grid};
use rand::{Rng, seq::IndexedRandom};
use serde::Serialize;
use tracing::info;

use crate::config::DensityExperiment;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityRun {
    pub target: NodeId,
    pub density: u64,
    pub class: DensityClass,
    pub k: u32,
    pub region_size: usize,
    pub satisfied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensitySummary {
    pub avg_density: f64,
    pub avg_k: f64,
    pub avg_region_size: f64,
    pub max_region_size: usize,
    pub min_region_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityResults {
    pub runs: Vec<DensityRun>,
    /// `None` when no run was requested.
    pub summary: Option<DensitySummary>,
}

pub fn run<R: Rng + ?Sized>(
    conf: &DensityExperiment,
    rng: &mut R,
) -> anyhow::Result<DensityResults> {
    let graph = grid(conf.grid_size)?;
    let population = Population::scatter(&graph, conf.population, rng)?;
    let engine = DensityAwareEngine::new(&graph, &population, conf.policy)?;
    let nodes: Vec<NodeId> = graph.node_ids().collect();

    let mut runs = Vec::with_capacity(conf.runs);
    for i in 0..conf.runs {
        let Some(&target) = nodes.choose(rng) else {
            break;
        };
        let report = engine.anonymize(target)?;
        let run = DensityRun {
            target,
            density: report.density,
            class: report.class,
            k: report.k,
            region_size: report.expansion.region.len(),
            satisfied: report.expansion.is_satisfied(),
        };
        info!(
            run = i + 1,
            target,
            density = run.density,
            class = %run.class,
            k = run.k,
            region_size = run.region_size,
            "density-aware run"
        );
        runs.push(run);
    }

    let summary = summarize(&runs);
    Ok(DensityResults { runs, summary })
}

fn summarize(runs: &[DensityRun]) -> Option<DensitySummary> {
    let densities: Vec<f64> = runs.iter().map(|r| r.density as f64).collect();
    let ks: Vec<f64> = runs.iter().map(|r| f64::from(r.k)).collect();
    let sizes: Vec<f64> = runs.iter().map(|r| r.region_size as f64).collect();
    Some(DensitySummary {
        avg_density: mean(&densities)?,
        avg_k: mean(&ks)?,
        avg_region_size: mean(&sizes)?,
        max_region_size: runs.iter().map(|r| r.region_size).max()?,
        min_region_size: runs.iter().map(|r| r.region_size).min()?,
    })
}
