use geo_types::Point;
use rstar::{primitives::GeomWithData, RTree};

use crate::{NodeId, SpatialGraph};

/// R-tree over node positions, used to snap free coordinates back onto the network.
#[derive(Debug, Clone)]
pub struct NodeIndex {
    pub index: RTree<GeomWithData<Point<f64>, NodeId>>,
}

impl NodeIndex {
    pub fn new() -> NodeIndex {
        Self {
            index: RTree::new(),
        }
    }

    pub fn from_graph(graph: &SpatialGraph) -> NodeIndex {
        let geomdata: Vec<GeomWithData<Point<f64>, NodeId>> = graph
            .nodes()
            .map(|node| GeomWithData::new(node.position, node.id))
            .collect();

        NodeIndex {
            index: RTree::bulk_load(geomdata),
        }
    }

    pub fn insert(&mut self, id: NodeId, position: Point<f64>) {
        self.index.insert(GeomWithData::new(position, id));
    }

    pub fn len(&self) -> usize {
        self.index.size()
    }

    pub fn is_empty(&self) -> bool {
        self.index.size() == 0
    }

    /// Closest node to `point`, `None` only for an empty index.
    pub fn nearest(&self, point: Point<f64>) -> Option<NodeId> {
        self.index.nearest_neighbor(&point).map(|n| n.data)
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        Self::new()
    }
}
