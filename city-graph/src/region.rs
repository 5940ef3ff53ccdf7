use std::collections::{btree_set, BTreeSet};

use geo_types::{MultiPoint, Point};
use serde::Serialize;

use crate::{GraphError, NodeId, SpatialGraph};

/// Set of nodes disclosed in place of a precise location. Always contains its seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    seed: NodeId,
    nodes: BTreeSet<NodeId>,
}

impl Region {
    pub fn new(seed: NodeId) -> Self {
        Self {
            seed,
            nodes: BTreeSet::from([seed]),
        }
    }

    pub fn seed(&self) -> NodeId {
        self.seed
    }

    /// Returns whether the node was newly added.
    pub fn insert(&mut self, node: NodeId) -> bool {
        self.nodes.insert(node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Never zero.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn positions(&self, graph: &SpatialGraph) -> Result<MultiPoint<f64>, GraphError> {
        self.iter()
            .map(|id| graph.position(id))
            .collect::<Result<Vec<Point<f64>>, _>>()
            .map(MultiPoint::from)
    }
}

impl Extend<NodeId> for Region {
    fn extend<I: IntoIterator<Item = NodeId>>(&mut self, iter: I) {
        self.nodes.extend(iter)
    }
}

impl<'a> IntoIterator for &'a Region {
    type Item = &'a NodeId;
    type IntoIter = btree_set::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
