use std::collections::HashMap;

use rand::{seq::IndexedRandom, Rng};
use serde::Serialize;

use crate::{GraphError, NodeId, SpatialGraph};

/// Aggregate head-count per node, used by density-driven anonymization.
///
/// Only nodes of the graph it was built from are known; anything else is an
/// [`GraphError::UnknownNode`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Population {
    counts: HashMap<NodeId, u32>,
}

impl Population {
    /// Every node of `graph` with a count of zero.
    pub fn empty(graph: &SpatialGraph) -> Self {
        Self {
            counts: graph.node_ids().map(|id| (id, 0)).collect(),
        }
    }

    /// Drops `count` users one at a time on uniformly chosen nodes.
    pub fn scatter<R: Rng + ?Sized>(
        graph: &SpatialGraph,
        count: u32,
        rng: &mut R,
    ) -> Result<Self, GraphError> {
        let mut population = Self::empty(graph);
        let nodes: Vec<NodeId> = graph.node_ids().collect();
        for _ in 0..count {
            let node = nodes.choose(rng).ok_or(GraphError::EmptyGraph)?;
            *population.counts.entry(*node).or_default() += 1;
        }
        Ok(population)
    }

    pub fn at(&self, node: NodeId) -> Result<u32, GraphError> {
        self.counts
            .get(&node)
            .copied()
            .ok_or(GraphError::UnknownNode(node))
    }

    pub fn set(&mut self, node: NodeId, count: u32) -> Result<(), GraphError> {
        let slot = self
            .counts
            .get_mut(&node)
            .ok_or(GraphError::UnknownNode(node))?;
        *slot = count;
        Ok(())
    }

    pub fn add(&mut self, node: NodeId, count: u32) -> Result<u32, GraphError> {
        let slot = self
            .counts
            .get_mut(&node)
            .ok_or(GraphError::UnknownNode(node))?;
        *slot = slot.saturating_add(count);
        Ok(*slot)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        self.counts.iter().map(|(&id, &c)| (id, c))
    }
}
