use std::collections::{HashSet, VecDeque};

use city_graph::{NodeId, Population, Region, SpatialGraph};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{AnonymityError, Shortfall};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensityClass {
    Sparse,
    Medium,
    Dense,
}

/// Thresholds turning an observed local density into an anonymity target.
///
/// The mapping is inverse: few people nearby means a *larger* `k`, so the
/// disclosed region in a sparse area is coarse, while a crowded area can satisfy a small
/// `k` with a tight region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityPolicy {
    /// Densities strictly below this are [`DensityClass::Sparse`].
    pub sparse_below: u64,
    /// Densities strictly below this (and not sparse) are [`DensityClass::Medium`].
    pub medium_below: u64,
    pub sparse_k: u32,
    pub medium_k: u32,
    pub dense_k: u32,
    /// Hops searched by [`DensityAwareEngine::anonymize`] when estimating density.
    pub depth: u32,
}

impl Default for DensityPolicy {
    fn default() -> Self {
        Self {
            sparse_below: 4,
            medium_below: 10,
            sparse_k: 10,
            medium_k: 5,
            dense_k: 2,
            depth: 1,
        }
    }
}

impl DensityPolicy {
    pub fn validate(&self) -> Result<(), AnonymityError> {
        if self.sparse_k == 0 || self.medium_k == 0 || self.dense_k == 0 {
            return Err(AnonymityError::InvalidK);
        }
        if self.sparse_below > self.medium_below {
            return Err(AnonymityError::InvalidPolicy(
                "sparse threshold exceeds medium threshold",
            ));
        }
        Ok(())
    }

    pub fn classify(&self, density: u64) -> DensityClass {
        if density < self.sparse_below {
            DensityClass::Sparse
        } else if density < self.medium_below {
            DensityClass::Medium
        } else {
            DensityClass::Dense
        }
    }

    pub fn select_k(&self, density: u64) -> u32 {
        match self.classify(density) {
            DensityClass::Sparse => self.sparse_k,
            DensityClass::Medium => self.medium_k,
            DensityClass::Dense => self.dense_k,
        }
    }
}

/// Result of [`DensityAwareEngine::expand_region`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionExpansion {
    pub region: Region,
    /// Aggregate population of `region`.
    pub population: u64,
    pub target: u32,
}

impl RegionExpansion {
    pub fn shortfall(&self) -> Option<Shortfall> {
        Shortfall::check(self.population, self.target.into())
    }

    pub fn is_satisfied(&self) -> bool {
        self.shortfall().is_none()
    }
}

/// One full density-aware query: estimate, classify, pick `k`, grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DensityReport {
    pub seed: NodeId,
    pub density: u64,
    pub class: DensityClass,
    pub k: u32,
    pub expansion: RegionExpansion,
}

pub struct DensityAwareEngine<'a> {
    graph: &'a SpatialGraph,
    population: &'a Population,
    policy: DensityPolicy,
}

impl<'a> DensityAwareEngine<'a> {
    pub fn new(
        graph: &'a SpatialGraph,
        population: &'a Population,
        policy: DensityPolicy,
    ) -> Result<Self, AnonymityError> {
        policy.validate()?;
        Ok(Self {
            graph,
            population,
            policy,
        })
    }

    pub fn policy(&self) -> &DensityPolicy {
        &self.policy
    }

    /// Population within `depth` hops of `node`, the node itself included. Each node is
    /// counted once even when cycles offer several paths to it.
    pub fn local_density(&self, node: NodeId, depth: u32) -> Result<u64, AnonymityError> {
        self.graph.node(node)?;
        let mut visited = HashSet::from([node]);
        let mut queue = VecDeque::from([(node, 0u32)]);
        let mut total = u64::from(self.population.at(node)?);

        while let Some((current, hops)) = queue.pop_front() {
            if hops >= depth {
                continue;
            }
            for neigh in self.graph.neighbors(current)? {
                if visited.insert(neigh) {
                    queue.push_back((neigh, hops + 1));
                    total += u64::from(self.population.at(neigh)?);
                }
            }
        }
        Ok(total)
    }

    pub fn classify(&self, density: u64) -> DensityClass {
        self.policy.classify(density)
    }

    pub fn select_k(&self, density: u64) -> u32 {
        self.policy.select_k(density)
    }

    /// Breadth-first growth from `seed` until the region holds at least `k` people.
    ///
    /// Neighbours of the node being expanded are added one by one and growth stops the moment
    /// the target is met, even halfway through that node's neighbour list. If the component
    /// of `seed` runs dry first, the returned expansion carries a [`Shortfall`].
    pub fn expand_region(&self, seed: NodeId, k: u32) -> Result<RegionExpansion, AnonymityError> {
        if k == 0 {
            return Err(AnonymityError::InvalidK);
        }
        self.graph.node(seed)?;
        let target = u64::from(k);
        let mut region = Region::new(seed);
        let mut queue = VecDeque::from([seed]);
        let mut population = u64::from(self.population.at(seed)?);

        'grow: while population < target {
            let Some(current) = queue.pop_front() else {
                break;
            };
            for neigh in self.graph.neighbors(current)? {
                if region.insert(neigh) {
                    queue.push_back(neigh);
                    population += u64::from(self.population.at(neigh)?);
                    if population >= target {
                        break 'grow;
                    }
                }
            }
        }

        let expansion = RegionExpansion {
            region,
            population,
            target: k,
        };
        match expansion.shortfall() {
            Some(shortfall) => warn!(seed, k, %shortfall, "region exhausted before reaching k"),
            None => debug!(seed, k, size = expansion.region.len(), population, "region expanded"),
        }
        Ok(expansion)
    }

    pub fn anonymize(&self, seed: NodeId) -> Result<DensityReport, AnonymityError> {
        let density = self.local_density(seed, self.policy.depth)?;
        let k = self.select_k(density);
        let expansion = self.expand_region(seed, k)?;
        Ok(DensityReport {
            seed,
            density,
            class: self.classify(density),
            k,
            expansion,
        })
    }
}
