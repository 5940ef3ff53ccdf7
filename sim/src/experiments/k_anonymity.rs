use analyzer::{coverage, location_error, mean, region_extent};
use anonymity::{AnonymizedLocation, KAnonymityEngine};
use city_graph::{SpatialGraph, UserRegistry, grid_with_diagonals};
use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::config::KAnonExperiment;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KRun {
    pub k: usize,
    /// Mean over users whose region met `k`; infinite when none did.
    pub mean_error: f64,
    pub mean_region_extent: f64,
    /// Percentage of users whose region met `k`.
    pub coverage: f64,
    /// Users that only got the unprotected fallback region.
    pub fallbacks: usize,
}

pub fn run<R: Rng + ?Sized>(conf: &KAnonExperiment, rng: &mut R) -> anyhow::Result<Vec<KRun>> {
    let graph = grid_with_diagonals(conf.grid_size, conf.diagonal_probability, rng)?;
    let users = UserRegistry::scatter(&graph, conf.users, rng)?;

    // the graph and registry are only read from here on
    conf.k_values
        .par_iter()
        .map(|&k| evaluate(&graph, &users, k))
        .collect()
}

fn evaluate(graph: &SpatialGraph, users: &UserRegistry, k: usize) -> anyhow::Result<KRun> {
    let engine = KAnonymityEngine::new(graph, users, k)?;
    let mut errors = Vec::new();
    let mut extents = Vec::new();
    let mut fallbacks = 0;

    for (user, placement) in users.iter() {
        match engine.anonymized_location(user)? {
            AnonymizedLocation::Anonymous(disclosure) => {
                errors.push(location_error(placement.position, disclosure.location));
                extents.push(region_extent(&disclosure.region, graph)?);
            }
            AnonymizedLocation::Fallback { .. } => fallbacks += 1,
        }
    }

    let run = KRun {
        k,
        mean_error: mean(&errors).unwrap_or(f64::INFINITY),
        mean_region_extent: mean(&extents).unwrap_or(0.0),
        coverage: coverage(errors.len(), users.len()),
        fallbacks,
    };
    info!(
        k,
        mean_error = run.mean_error,
        mean_region_extent = run.mean_region_extent,
        coverage = run.coverage,
        "k-anonymity run"
    );
    Ok(run)
}
